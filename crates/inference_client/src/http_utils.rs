//! HTTP client construction: proxies and retry middleware

use std::time::Duration;

use chat_core::Config;
use reqwest::{Client, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

/// Build the shared HTTP client, honouring the configured proxies.
pub fn build_http_client(config: &Config) -> reqwest::Result<Client> {
    let mut builder = Client::builder();
    if !config.http_proxy.is_empty() {
        log::debug!("Using HTTP proxy {}", config.http_proxy);
        builder = builder.proxy(Proxy::http(&config.http_proxy)?);
    }
    if !config.https_proxy.is_empty() {
        log::debug!("Using HTTPS proxy {}", config.https_proxy);
        builder = builder.proxy(Proxy::https(&config.https_proxy)?);
    }
    builder.build()
}

/// Wrap `client` with transient-error retries. Zero retries means no middleware.
pub fn build_retry_client(client: Client, max_retries: u32) -> ClientWithMiddleware {
    if max_retries == 0 {
        return ClientBuilder::new(client).build();
    }

    // Exponential backoff starting at 200ms, capped at 5s, with jitter
    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(Duration::from_millis(200), Duration::from_secs(5))
        .build_with_max_retries(max_retries);

    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client_without_proxy() {
        let config = Config::default();
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let mut config = Config::default();
        config.http_proxy = "http://127.0.0.1:3128".to_string();
        config.https_proxy = "http://127.0.0.1:3128".to_string();
        assert!(build_http_client(&config).is_ok());
    }
}

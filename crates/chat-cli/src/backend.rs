//! Store and generator construction from configuration

use std::sync::Arc;

use anyhow::{anyhow, Context};
use chat_core::{Config, StoreBackend};
use inference_client::{build_http_client, InferenceClient, ReplyGenerator};
use storage_manager::{ChatStore, MemoryChatStore, RestChatStore, SqliteChatStore};

pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn ChatStore>> {
    let store: Arc<dyn ChatStore> = match config.store.backend {
        StoreBackend::Memory => {
            log::info!("Using in-memory store");
            Arc::new(MemoryChatStore::new())
        }
        StoreBackend::Sqlite => {
            let path = config.store.database_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            log::info!("Using SQLite store at {}", path.display());
            let store = SqliteChatStore::open(&path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Arc::new(store)
        }
        StoreBackend::Rest => {
            let url = config
                .store
                .rest_url
                .as_deref()
                .ok_or_else(|| anyhow!("rest store needs SUPABASE_URL or store.rest_url"))?;
            let key = config
                .store
                .rest_key
                .as_deref()
                .ok_or_else(|| anyhow!("rest store needs SUPABASE_KEY or store.rest_key"))?;
            log::info!("Using REST store at {}", url);
            let client = build_http_client(config).context("building HTTP client")?;
            Arc::new(RestChatStore::new(url, key).with_client(client))
        }
    };
    Ok(store)
}

pub fn build_generator(config: &Config) -> anyhow::Result<Arc<dyn ReplyGenerator>> {
    if config.inference.api_key.is_none() {
        log::warn!("No HUGGINGFACE_API_KEY set; generation requests are unauthenticated");
    }
    let client = InferenceClient::from_config(config).context("building inference client")?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_sqlite_store_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.database_path = Some(dir.path().join("nested").join("chat.db"));

        let store = open_store(&config).await.unwrap();

        assert!(store.list_conversations().await.unwrap().is_empty());
        assert!(dir.path().join("nested").join("chat.db").exists());
    }

    #[tokio::test]
    async fn test_rest_store_requires_url_and_key() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Rest;
        config.store.rest_url = Some("http://localhost:54321".to_string());

        let err = open_store(&config).await.err().unwrap();
        assert!(err.to_string().contains("SUPABASE_KEY"));
    }
}

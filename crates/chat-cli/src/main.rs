mod backend;
mod logging;
mod render;
mod repl;

use std::path::PathBuf;

use anyhow::Context;
use chat_core::{Config, ConversationId, StoreBackend};
use clap::{Parser, Subcommand};
use colored::Colorize;
use session_manager::{ChatSession, ConversationDirectory};

use crate::backend::{build_generator, open_store};
use crate::logging::init_logging;
use crate::render::{print_directory, print_threads};

#[derive(Parser)]
#[command(name = "chat-cli")]
#[command(about = "Threaded chat client with editable message history")]
#[command(version)]
struct Cli {
    /// Storage backend: memory, sqlite or rest
    #[arg(long, value_parser = parse_backend)]
    store: Option<StoreBackend>,

    /// SQLite database file
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Text-generation endpoint URL
    #[arg(long)]
    inference_url: Option<String>,

    /// Retries for transient generation failures
    #[arg(long)]
    max_retries: Option<u32>,

    /// Enable debug logging
    #[arg(long, short, env = "CHAT_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List conversations
    Conversations,
    /// Create a conversation
    New {
        /// Title (defaults to "New Chat")
        #[arg(long)]
        title: Option<String>,
    },
    /// Show a conversation's threads
    History {
        conversation: ConversationId,
    },
    /// Send one message and print the conversation
    Send {
        conversation: ConversationId,
        /// Message text
        text: String,
    },
    /// Interactive chat; opens a new conversation when none is given
    Chat {
        conversation: Option<ConversationId>,
    },
}

fn parse_backend(value: &str) -> Result<StoreBackend, String> {
    value.parse()
}

impl Cli {
    /// Apply command-line overrides on top of file and environment config
    fn apply_to(&self, config: &mut Config) {
        if let Some(backend) = self.store {
            config.store.backend = backend;
        }
        if let Some(path) = &self.db_path {
            config.store.database_path = Some(path.clone());
        }
        if let Some(url) = &self.inference_url {
            config.inference.api_base = url.clone();
        }
        if let Some(retries) = self.max_retries {
            config.inference.max_retries = retries;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut config = Config::new();
    cli.apply_to(&mut config);
    log::debug!(
        "Store backend {}, inference endpoint {}",
        config.store.backend,
        config.inference.api_base
    );

    let store = open_store(&config).await?;
    let directory = ConversationDirectory::new(store.clone());
    directory
        .refresh()
        .await
        .context("loading conversations")?;

    match cli.command {
        Commands::Conversations => {
            print_directory(&directory.entries(None).await);
        }
        Commands::New { title } => {
            let conversation = directory.create(title.as_deref()).await?;
            println!(
                "{} {} ({})",
                "Created".green(),
                conversation.id,
                conversation.title
            );
        }
        Commands::History { conversation } => {
            let session = ChatSession::new(store, build_generator(&config)?);
            open_conversation(&directory, &session, conversation).await?;
            print_threads(&session.thread_views().await);
        }
        Commands::Send { conversation, text } => {
            let session = ChatSession::new(store, build_generator(&config)?);
            open_conversation(&directory, &session, conversation).await?;
            let outcome = session.send_new(&text).await?;
            if outcome.reply.is_none() {
                eprintln!("{}", "No reply was generated.".yellow());
            }
            print_threads(&session.thread_views().await);
        }
        Commands::Chat { conversation } => {
            let session = ChatSession::new(store, build_generator(&config)?);
            let id = match conversation {
                Some(id) => id,
                None => directory.create(None).await?.id,
            };
            let title = open_conversation(&directory, &session, id).await?;
            repl::run(session, &title).await?;
        }
    }

    Ok(())
}

/// Select `id` in the session; returns its title
async fn open_conversation(
    directory: &ConversationDirectory,
    session: &ChatSession,
    id: ConversationId,
) -> anyhow::Result<String> {
    let conversation = directory
        .get(id)
        .await
        .with_context(|| format!("no conversation {id}"))?;
    session
        .select_conversation(Some(id))
        .await
        .with_context(|| format!("loading conversation {id}"))?;
    Ok(conversation.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "chat-cli",
            "--store",
            "memory",
            "--inference-url",
            "http://localhost:8000/generate",
            "--max-retries",
            "2",
            "conversations",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.inference.api_base, "http://localhost:8000/generate");
        assert_eq!(config.inference.max_retries, 2);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Cli::try_parse_from(["chat-cli", "--store", "redis", "conversations"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_send_takes_conversation_and_text() {
        let id = uuid::Uuid::new_v4();
        let id_arg = id.to_string();
        let cli = Cli::parse_from(["chat-cli", "send", id_arg.as_str(), "hello"]);
        match cli.command {
            Commands::Send { conversation, text } => {
                assert_eq!(conversation, id);
                assert_eq!(text, "hello");
            }
            _ => panic!("expected send"),
        }
    }
}

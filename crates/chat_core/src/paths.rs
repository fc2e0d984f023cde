use std::path::PathBuf;

/// Client data directory (~/.threadchat)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".threadchat")
}

/// config.json path
pub fn config_json_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default SQLite database path
pub fn default_database_path() -> PathBuf {
    data_dir().join("chat.db")
}

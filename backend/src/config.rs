use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_POLLS_FILE: &str = "polls.csv";
const DEFAULT_ACCOUNTS_FILE: &str = "users.csv";

/// Application settings read from the same figment as Rocket's own config,
/// so `Rocket.toml` and `ROCKET_DATA_DIR`-style variables both apply.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_polls_file")]
    pub polls_file: String,
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,
}

impl AppConfig {
    pub fn polls_path(&self) -> PathBuf {
        self.data_dir.join(&self.polls_file)
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join(&self.accounts_file)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_polls_file() -> String {
    DEFAULT_POLLS_FILE.to_string()
}

fn default_accounts_file() -> String {
    DEFAULT_ACCOUNTS_FILE.to_string()
}

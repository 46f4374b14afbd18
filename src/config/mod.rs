use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

use crate::api::TokenStore;

const ENV_PREFIX: &str = "BILLING_";

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the billing API (`BILLING_API_URL`)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Credential file overriding the platform default (`BILLING_TOKEN_STORE`)
    #[serde(default)]
    pub token_store: Option<PathBuf>,
    /// Where logs go while the terminal UI owns the screen (`BILLING_LOG_FILE`)
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_api_url() -> String {
    "http://localhost:8000/api/".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("billing-admin.log")
}

impl Config {
    /// Load configuration from `BILLING_*` environment variables, after
    /// reading a `.env` file if there is one.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;
        Ok(config)
    }

    /// Build configuration from explicit variables instead of the process
    /// environment.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        Ok(config)
    }

    /// Credential store at the configured path, or the platform default.
    pub fn token_store(&self) -> Result<TokenStore> {
        let path = match &self.token_store {
            Some(path) => path.clone(),
            None => TokenStore::default_location()?,
        };
        Ok(TokenStore::new(path))
    }
}

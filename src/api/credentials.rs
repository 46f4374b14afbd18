use std::fs;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Key under which the access token is kept in the store.
pub const TOKEN_KEY: &str = "access_token";

/// Supplies the bearer token for each request.
///
/// Implementations are asked on every call, so a token written to the store
/// while the client is running is picked up by the next request.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> impl Future<Output = ApiResult<String>> + Send;
}

/// A fixed token, for scripting and tests.
#[derive(Debug, Clone)]
pub struct StaticCredential(String);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticCredential {
    async fn token(&self) -> ApiResult<String> {
        if self.0.is_empty() {
            return Err(ApiError::MissingCredential);
        }
        Ok(self.0.clone())
    }
}

/// Persistent key-value store backed by a small TOML file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `credentials.toml` in the platform config directory.
    pub fn default_location() -> ApiResult<PathBuf> {
        let dirs = ProjectDirs::from("", "", "billing-admin").ok_or_else(|| {
            ApiError::CredentialStore("could not determine a config directory".to_string())
        })?;
        Ok(dirs.config_dir().join("credentials.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> ApiResult<toml::Table> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(toml::Table::new()),
            Err(e) => {
                return Err(ApiError::CredentialStore(format!(
                    "failed to read {:?}: {}",
                    self.path, e
                )));
            }
        };
        toml::from_str(&contents).map_err(|e| {
            ApiError::CredentialStore(format!("failed to parse {:?}: {}", self.path, e))
        })
    }

    fn write_table(&self, table: &toml::Table) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::CredentialStore(format!("failed to create {:?}: {}", parent, e))
            })?;
        }
        let contents = toml::to_string(table)
            .map_err(|e| ApiError::CredentialStore(e.to_string()))?;
        fs::write(&self.path, contents).map_err(|e| {
            ApiError::CredentialStore(format!("failed to write {:?}: {}", self.path, e))
        })
    }

    pub fn get(&self, key: &str) -> ApiResult<Option<String>> {
        let table = self.read_table()?;
        Ok(table
            .get(key)
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }

    pub fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        self.write_table(&table)?;
        debug!(path = ?self.path, key, "stored credential");
        Ok(())
    }

    /// Returns whether the key was present.
    pub fn remove(&self, key: &str) -> ApiResult<bool> {
        let mut table = self.read_table()?;
        let removed = table.remove(key).is_some();
        if removed {
            self.write_table(&table)?;
        }
        Ok(removed)
    }
}

impl CredentialProvider for TokenStore {
    /// The file is read on the blocking pool, off the runtime threads.
    async fn token(&self) -> ApiResult<String> {
        let store = self.clone();
        let token = tokio::task::spawn_blocking(move || store.get(TOKEN_KEY))
            .await
            .map_err(|e| ApiError::CredentialStore(format!("token read did not finish: {}", e)))??;
        token
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingCredential)
    }
}

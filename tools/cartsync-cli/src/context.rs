//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use cartsync_cache::{Cache, FileStore};
use cartsync_data::{FetchClient, ReqwestTransport};
use cartsync_store::{CartStore, HttpCartApi, StoredTokenAuth};

use crate::config::CliConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["cartsync.toml", ".cartsync.toml", "cartsync.json"];

/// Execution context for CLI commands.
pub struct Context {
    pub config: CliConfig,
    pub output: Output,
    pub cwd: PathBuf,
    /// Config file the settings came from, if any.
    pub config_path: Option<PathBuf>,
}

/// A cart store wired to device storage and the storefront API.
pub struct CartSession {
    pub store: CartStore,
    pub auth: StoredTokenAuth,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(PathBuf::from(path))),
            None => match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        Ok(Self {
            config: config.with_env_overrides(),
            output,
            cwd,
            config_path,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    match CliConfig::load(config_path.to_str()?) {
                        Ok(config) => return Some((config, config_path)),
                        Err(e) => tracing::warn!(path = %config_path.display(), "Skipping config: {:#}", e),
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Path of the local storage file, resolved against the working directory.
    pub fn storage_path(&self) -> PathBuf {
        let path = Path::new(&self.config.storage.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Open device storage.
    pub async fn open_storage(&self) -> Result<Cache> {
        let path = self.storage_path();
        let store = FileStore::open(&path)
            .await
            .with_context(|| format!("Failed to open storage: {}", path.display()))?;
        self.output
            .debug(&format!("Using storage {}", store.path().display()));
        Ok(Cache::new(store))
    }

    /// Build a cart session over `cache`.
    ///
    /// The API client carries the stored auth token, so a session opened
    /// before signing in must be reopened afterwards.
    pub async fn open_cart(&self, cache: Cache) -> Result<CartSession> {
        let auth = StoredTokenAuth::new(cache.clone());

        let transport =
            ReqwestTransport::with_timeout(Duration::from_millis(self.config.server.timeout_ms))
                .context("Failed to build HTTP client")?;
        let mut client =
            FetchClient::with_transport(transport).with_base_url(&self.config.server.base_url);
        if let Some(token) = auth.token().await? {
            client = client.with_bearer_auth(token);
        }

        let store = CartStore::new(
            cache,
            Arc::new(HttpCartApi::new(client)),
            Arc::new(auth.clone()),
        );
        store.on_change(|| tracing::debug!("cart changed"));

        Ok(CartSession { store, auth })
    }
}

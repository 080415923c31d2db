//! Configuration resolution with hierarchical merge

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use treesync_fs::{NormalizedPath, RepoPath};
use treesync_store::validate_repository_name;

use super::manifest::Manifest;
use crate::strategy::StrategySetting;
use crate::{Error, Result};

/// Inline text limit used when no layer sets one: 1 MiB.
pub const DEFAULT_MAX_TEXT_SIZE: u64 = 1024 * 1024;

const ENV_STORE: &str = "TREESYNC_STORE";
const ENV_REMOTES: &str = "TREESYNC_REMOTES";
const ENV_STRATEGY: &str = "TREESYNC_UPLOAD_STRATEGY";
const ENV_MAX_TEXT_SIZE: &str = "TREESYNC_MAX_TEXT_SIZE";

/// The effective configuration for one push or fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Remote names in precedence order
    pub remotes: Vec<String>,
    /// Tree store root, absolute
    pub store: Option<NormalizedPath>,
    pub strategy: StrategySetting,
    pub max_text_size: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remotes: Vec::new(),
            store: None,
            strategy: StrategySetting::default(),
            max_text_size: DEFAULT_MAX_TEXT_SIZE,
        }
    }
}

impl SyncConfig {
    /// The remote that pushes commit to.
    pub fn push_target(&self) -> Result<&str> {
        self.remotes
            .first()
            .map(String::as_str)
            .ok_or(Error::NoRemotesConfigured)
    }

    /// The configured store root.
    pub fn store_root(&self) -> Result<&NormalizedPath> {
        self.store.as_ref().ok_or_else(|| Error::InvalidConfig {
            key: "store".to_string(),
            message: format!("not set; add `store = \"<dir>\"` or set {ENV_STORE}"),
        })
    }

    fn from_manifest(manifest: Manifest, root: &NormalizedPath) -> Result<Self> {
        for remote in &manifest.remotes {
            validate_repository_name(remote).map_err(|_| Error::InvalidConfig {
                key: "remotes".to_string(),
                message: format!("'{remote}' is not a valid repository name"),
            })?;
        }
        let max_text_size = manifest.upload.max_text_size.unwrap_or(DEFAULT_MAX_TEXT_SIZE);
        if max_text_size == 0 {
            return Err(Error::InvalidConfig {
                key: "upload.max_text_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let store = manifest.store.map(|store| {
            let path = NormalizedPath::new(&store);
            if path.as_str().starts_with('/') || std::path::Path::new(&store).is_absolute() {
                path
            } else {
                root.join(path.as_str())
            }
        });

        Ok(Self {
            remotes: manifest.remotes,
            store,
            strategy: manifest.upload.strategy.unwrap_or_default(),
            max_text_size,
        })
    }
}

/// Resolves configuration by merging multiple sources
pub struct ConfigResolver {
    /// Repository root directory
    root: NormalizedPath,

    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,

    /// Replacement for the process environment (used for testing).
    env_override: Option<HashMap<String, String>>,
}

impl ConfigResolver {
    /// Create a resolver for the repository at `root`.
    ///
    /// The global config lives at `dirs::config_dir()/treesync/config.toml`.
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            global_config_dir_override: None,
            env_override: None,
        }
    }

    /// Use `dir` instead of the platform global config directory.
    pub fn with_global_config_dir(mut self, dir: PathBuf) -> Self {
        self.global_config_dir_override = Some(dir);
        self
    }

    /// Read environment overrides from `env` instead of the process.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env_override = Some(env);
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("treesync"))
    }

    fn env_var(&self, key: &str) -> Option<String> {
        match &self.env_override {
            Some(env) => env.get(key).cloned(),
            None => std::env::var(key).ok(),
        }
    }

    /// Path of the repository config file.
    pub fn config_path(&self) -> NormalizedPath {
        self.root
            .join(RepoPath::ConfigDir.as_str())
            .join(RepoPath::ConfigFile.as_str())
    }

    fn local_config_path(&self) -> NormalizedPath {
        self.root
            .join(RepoPath::ConfigDir.as_str())
            .join(RepoPath::LocalConfigFile.as_str())
    }

    /// Check if a repository configuration exists
    pub fn has_config(&self) -> bool {
        self.config_path().is_file()
    }

    /// Get the repository root path
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Resolve the configuration by merging all sources
    ///
    /// Missing files are skipped. Invalid TOML in any file and invalid
    /// environment values are errors.
    pub fn resolve(&self) -> Result<SyncConfig> {
        let mut manifest = Manifest::default();

        // Layer 1 - Global defaults
        if let Some(global_dir) = self.global_config_dir() {
            let global_config_path = global_dir.join("config.toml");
            if global_config_path.is_file() {
                tracing::debug!(?global_config_path, "Loading global config (layer 1)");
                let content = fs::read_to_string(&global_config_path)?;
                manifest.merge(&Manifest::parse(&content)?);
            } else {
                tracing::debug!(?global_config_path, "No global config found (layer 1)");
            }
        }

        // Layer 2 - Repository config
        let repo_config_path = self.config_path();
        if repo_config_path.is_file() {
            tracing::debug!(%repo_config_path, "Loading repo config (layer 2)");
            let content = fs::read_to_string(repo_config_path.to_native())?;
            manifest.merge(&Manifest::parse(&content)?);
        }

        // Layer 3 - Local overrides
        let local_config_path = self.local_config_path();
        if local_config_path.is_file() {
            tracing::debug!(%local_config_path, "Loading local config (layer 3)");
            let content = fs::read_to_string(local_config_path.to_native())?;
            manifest.merge(&Manifest::parse(&content)?);
        }

        // Layer 4 - Environment
        manifest.merge(&self.env_manifest()?);

        SyncConfig::from_manifest(manifest, &self.root)
    }

    fn env_manifest(&self) -> Result<Manifest> {
        let mut manifest = Manifest::default();

        if let Some(store) = self.env_var(ENV_STORE) {
            if store.trim().is_empty() {
                return Err(invalid_env(ENV_STORE, "must not be empty"));
            }
            manifest.store = Some(store);
        }

        if let Some(remotes) = self.env_var(ENV_REMOTES) {
            let names: Vec<String> = remotes
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                return Err(invalid_env(ENV_REMOTES, "must name at least one remote"));
            }
            manifest.remotes = names;
        }

        if let Some(strategy) = self.env_var(ENV_STRATEGY) {
            let setting = strategy
                .parse::<StrategySetting>()
                .map_err(|message| invalid_env(ENV_STRATEGY, &message))?;
            manifest.upload.strategy = Some(setting);
        }

        if let Some(size) = self.env_var(ENV_MAX_TEXT_SIZE) {
            let size = size
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid_env(ENV_MAX_TEXT_SIZE, "must be a whole number of bytes"))?;
            manifest.upload.max_text_size = Some(size);
        }

        Ok(manifest)
    }
}

fn invalid_env(key: &str, message: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        message: message.to_string(),
    }
}

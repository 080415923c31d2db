//! Well-known repository paths.

use std::path::Path;

/// Standard repository filesystem markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPath {
    /// Local content store, relative to the git directory
    ContentStore,
    /// Git hooks, relative to the git directory
    HooksDir,
    /// The `.treesync` directory (configuration root)
    ConfigDir,
    /// Repository configuration file, relative to the config root
    ConfigFile,
    /// Git-ignored local overrides, relative to the config root
    LocalConfigFile,
}

impl RepoPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentStore => "lfs/objects",
            Self::HooksDir => "hooks",
            Self::ConfigDir => ".treesync",
            Self::ConfigFile => "config.toml",
            Self::LocalConfigFile => "config.local.toml",
        }
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

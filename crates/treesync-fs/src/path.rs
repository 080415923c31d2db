//! Slash-separated paths shared by the VCS and the tree stores

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Repository-relative paths (as reported by the VCS and stored in remote
/// trees) and absolute working-copy paths both use this type. Empty and `.`
/// components are dropped, so `data//x.bin` and `./data/x.bin` compare equal
/// to `data/x.bin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Forward-slash form, without empty or `.` components
    inner: String,
}

impl NormalizedPath {
    /// Normalize any path-like input. Backslashes become forward slashes.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let absolute = raw.starts_with('/');
        let joined = raw
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .collect::<Vec<_>>()
            .join("/");

        let inner = match (absolute, joined.is_empty()) {
            (true, _) => format!("/{joined}"),
            (false, true) => ".".to_string(),
            (false, false) => joined,
        };
        Self { inner }
    }

    /// The normalized form as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Native path for handing to `std::fs`.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append `segment`, normalizing the result.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner == "." {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Everything before the last component. `None` for single components.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) if self.inner.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(0) => None,
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// The last component, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self.inner.as_str() {
            "." | "/" => None,
            s => s.rsplit('/').next(),
        }
    }

    /// Iterate over the path components, root first.
    ///
    /// An absolute path does not yield an empty leading component.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.inner
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
    }

    /// Split into directory components and the final component.
    ///
    /// Returns `None` for the empty path.
    pub fn split_leaf(&self) -> Option<(Vec<&str>, &str)> {
        let mut parts: Vec<&str> = self.components().collect();
        let leaf = parts.pop()?;
        Some((parts, leaf))
    }

    /// Whether this path equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &NormalizedPath) -> bool {
        if prefix.inner == "." {
            return true;
        }
        self.inner == prefix.inner
            || self
                .inner
                .strip_prefix(prefix.inner.as_str())
                .is_some_and(|rest| rest.starts_with('/') || prefix.inner.ends_with('/'))
    }

    // Filesystem probes on the native form

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

//! SHA-256 content identifiers
//!
//! A [`ContentId`] is the lowercase hex SHA-256 of a file's bytes. Equal ids
//! imply byte-identical content, which is what makes remote objects reusable
//! across snapshots and repositories. The prefixed form (`sha256:<hex>`) is
//! used where the algorithm must be spelled out, such as pointer files.

use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Prefix for the algorithm-qualified form of a content id
pub const PREFIX: &str = "sha256:";

/// Content-addressed identity of a blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Parse a content id from bare or `sha256:`-prefixed hex.
    pub fn parse(value: &str) -> Result<Self> {
        let hex = value.strip_prefix(PREFIX).unwrap_or(value);
        let valid = hex.len() == 64
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(Error::InvalidContentId {
                value: value.to_string(),
            });
        }
        Ok(Self(hex.to_string()))
    }

    /// Compute the id of in-memory bytes.
    pub fn for_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Compute the id of a file's contents without loading it whole.
    pub fn for_file(path: &Path) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher).map_err(|e| Error::io(path, e))?;
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    /// Bare hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Algorithm-qualified form, `sha256:<hex>`.
    pub fn to_prefixed(&self) -> String {
        format!("{}{}", PREFIX, self.0)
    }

    /// Two-level fan-out used by on-disk stores: `(aa, bb, full)`.
    pub fn shard(&self) -> (&str, &str, &str) {
        (&self.0[..2], &self.0[2..4], &self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}

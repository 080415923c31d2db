//! Manifest parsing for config.toml files
//!
//! A manifest is one parsed configuration file. Every field is optional so
//! that a layer only overrides what it actually sets.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::strategy::StrategySetting;

/// The `[upload]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategySetting>,

    /// Largest plain file, in bytes, stored inline by content-and-text pushes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_text_size: Option<u64>,
}

/// Repository configuration parsed from a single config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Remote repository names in precedence order; the first is the push target
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remotes: Vec<String>,

    /// Root directory of the tree store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,

    #[serde(default)]
    pub upload: UploadSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use treesync_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// remotes = ["primary", "mirror"]
    ///
    /// [upload]
    /// strategy = "content-and-text"
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.remotes, vec!["primary", "mirror"]);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Serialize to TOML; [`parse`](Self::parse) reads the result back.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another manifest into this one
    ///
    /// `other` takes precedence. A non-empty `remotes` list replaces the
    /// current list outright, since its order is the resolution order.
    pub fn merge(&mut self, other: &Manifest) {
        if !other.remotes.is_empty() {
            self.remotes = other.remotes.clone();
        }
        if other.store.is_some() {
            self.store = other.store.clone();
        }
        if other.upload.strategy.is_some() {
            self.upload.strategy = other.upload.strategy;
        }
        if other.upload.max_text_size.is_some() {
            self.upload.max_text_size = other.upload.max_text_size;
        }
    }
}

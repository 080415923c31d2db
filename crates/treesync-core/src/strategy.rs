//! Upload strategy selection
//!
//! Configuration and the command line speak in [`StrategySetting`], which
//! includes "as-before". A build only ever runs with a concrete
//! [`UploadStrategy`]; [`StrategySetting::resolve`] turns one into the other
//! using the metadata of the tree being replaced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use treesync_store::{TreeMeta, UploadStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategySetting {
    /// Reuse whatever the previous snapshot was built with
    #[default]
    AsBefore,
    ContentOnly,
    ContentAndText,
}

impl StrategySetting {
    /// The strategy a build should use given the previous root's metadata.
    ///
    /// "as-before" falls back to content-only when the previous snapshot
    /// does not record a strategy (including when there is no previous
    /// snapshot).
    pub fn resolve(self, previous: &TreeMeta) -> UploadStrategy {
        match self {
            Self::AsBefore => previous.upload_strategy.unwrap_or_default(),
            Self::ContentOnly => UploadStrategy::ContentOnly,
            Self::ContentAndText => UploadStrategy::ContentAndText,
        }
    }
}

impl FromStr for StrategySetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "as-before" | "previous" => Ok(Self::AsBefore),
            other => other.parse::<UploadStrategy>().map(Self::from),
        }
    }
}

impl From<UploadStrategy> for StrategySetting {
    fn from(strategy: UploadStrategy) -> Self {
        match strategy {
            UploadStrategy::ContentOnly => Self::ContentOnly,
            UploadStrategy::ContentAndText => Self::ContentAndText,
        }
    }
}

impl fmt::Display for StrategySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AsBefore => write!(f, "as-before"),
            Self::ContentOnly => write!(f, "content-only"),
            Self::ContentAndText => write!(f, "content-and-text"),
        }
    }
}

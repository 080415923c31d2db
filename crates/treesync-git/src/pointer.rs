//! LFS-style pointer files
//!
//! The index stores a small text pointer in place of tracked content:
//!
//! ```text
//! version https://git-lfs.github.com/spec/v1
//! oid sha256:<64 hex>
//! size <bytes>
//! ```

use treesync_fs::ContentId;

pub const VERSION_LINE: &str = "version https://git-lfs.github.com/spec/v1";

/// Pointers are never larger than this; anything bigger is real content.
pub const MAX_POINTER_SIZE: usize = 1024;

/// A parsed pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer {
    pub content_id: ContentId,
    pub size: u64,
}

impl Pointer {
    pub fn new(content_id: ContentId, size: u64) -> Self {
        Self { content_id, size }
    }

    /// Pointer describing `bytes`.
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Self::new(ContentId::for_bytes(bytes), bytes.len() as u64)
    }

    /// Parse pointer text, returning `None` if `bytes` is not a pointer.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > MAX_POINTER_SIZE {
            return None;
        }
        let text = std::str::from_utf8(bytes).ok()?;
        let mut lines = text.lines();
        if !lines.next()?.starts_with("version https://git-lfs.github.com/spec/") {
            return None;
        }

        let mut content_id = None;
        let mut size = None;
        for line in lines {
            if let Some(oid) = line.strip_prefix("oid ") {
                content_id = ContentId::parse(oid.trim()).ok();
            } else if let Some(value) = line.strip_prefix("size ") {
                size = value.trim().parse().ok();
            }
        }
        Some(Self::new(content_id?, size?))
    }

    /// Canonical pointer text.
    pub fn format(&self) -> String {
        format!(
            "{VERSION_LINE}\noid {}\nsize {}\n",
            self.content_id.to_prefixed(),
            self.size
        )
    }
}

//! Tree and object nodes
//!
//! A [`Tree`] exclusively owns its children, keyed by unique name. Children
//! are kept in a `BTreeMap` so serialization, and therefore the
//! [`TreeDigest`], does not depend on insertion order.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use treesync_fs::{ContentId, NormalizedPath};

use crate::Result;

/// Which files a snapshot carries besides tracked content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStrategy {
    /// Only tracked-content entries are stored.
    #[default]
    ContentOnly,
    /// Every path in the working listing is stored; plain files inline.
    ContentAndText,
}

impl FromStr for UploadStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "content-only" | "content" => Ok(Self::ContentOnly),
            "content-and-text" | "all" => Ok(Self::ContentAndText),
            _ => Err(format!("unknown upload strategy '{s}'")),
        }
    }
}

impl fmt::Display for UploadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentOnly => write!(f, "content-only"),
            Self::ContentAndText => write!(f, "content-and-text"),
        }
    }
}

/// Metadata attached to a tree node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeMeta {
    /// Strategy the tree was built with; authoritative for "as-before" pushes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_strategy: Option<UploadStrategy>,

    /// Keys this version does not interpret, preserved verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// What an object stands for in the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    /// Tracked content stored as a blob
    Content,
    /// A plain file stored inline
    Text,
    /// Placeholder describing a symbolic link
    Symlink,
    /// Placeholder describing a pinned subordinate repository
    Subrepository,
}

/// Metadata attached to an object node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub kind: ObjectKind,

    /// Identity of the stored bytes; only set for [`ObjectKind::Content`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<ContentId>,

    /// Size in bytes of the content or inline text
    pub size: u64,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// An object's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Payload {
    /// Reference to a blob in the store's content area
    Content(ContentId),
    /// Inline text
    Text(String),
}

/// A leaf node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    name: String,
    metadata: ObjectMeta,
    payload: Payload,
}

impl Object {
    /// An object referencing externally stored content.
    pub fn content(name: impl Into<String>, id: ContentId, size: u64) -> Self {
        Self {
            name: name.into(),
            metadata: ObjectMeta {
                kind: ObjectKind::Content,
                content_id: Some(id.clone()),
                size,
                extra: BTreeMap::new(),
            },
            payload: Payload::Content(id),
        }
    }

    /// An object carrying inline text.
    pub fn text(name: impl Into<String>, kind: ObjectKind, text: String) -> Self {
        Self {
            name: name.into(),
            metadata: ObjectMeta {
                kind,
                content_id: None,
                size: text.len() as u64,
                extra: BTreeMap::new(),
            },
            payload: Payload::Text(text),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The content id recorded in metadata, if any.
    pub fn stored_content_id(&self) -> Option<&ContentId> {
        self.metadata.content_id.as_ref()
    }
}

/// Either child kind of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Tree(Tree),
    Object(Object),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Tree(tree) => tree.name(),
            Node::Object(object) => object.name(),
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Node::Tree(tree) => Some(tree),
            Node::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Node::Object(object) => Some(object),
            Node::Tree(_) => None,
        }
    }
}

/// A container node that owns named children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    name: String,
    #[serde(default)]
    metadata: TreeMeta,
    #[serde(default)]
    children: BTreeMap<String, Node>,
}

impl Tree {
    /// Create a new, empty tree
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: TreeMeta::default(),
            children: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &TreeMeta {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut TreeMeta {
        &mut self.metadata
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Mutable access to a direct child by name.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.get_mut(name)
    }

    /// Children in name order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    /// Attach a child, replacing any existing child with the same name.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.children.insert(node.name().to_string(), node)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Follow `path` from this tree, returning the node it names.
    ///
    /// Returns `None` if any component is missing or an intermediate
    /// component is an object rather than a tree.
    pub fn get(&self, path: &NormalizedPath) -> Option<&Node> {
        let (dirs, leaf) = path.split_leaf()?;
        let mut tree = self;
        for dir in dirs {
            tree = tree.child(dir)?.as_tree()?;
        }
        tree.child(leaf)
    }

    /// Every object under this tree with its path relative to this tree.
    pub fn objects(&self) -> Vec<(NormalizedPath, &Object)> {
        let mut out = Vec::new();
        collect_objects(self, &NormalizedPath::new(""), &mut out);
        out
    }

    /// Identity of this tree: SHA-256 over its canonical serialization.
    ///
    /// Two trees with the same digest hold the same names, metadata and
    /// payload references at every level.
    pub fn digest(&self) -> Result<TreeDigest> {
        let encoded = serde_json::to_vec(self)?;
        Ok(TreeDigest(ContentId::for_bytes(&encoded)))
    }
}

fn collect_objects<'t>(
    tree: &'t Tree,
    prefix: &NormalizedPath,
    out: &mut Vec<(NormalizedPath, &'t Object)>,
) {
    for child in tree.children() {
        let path = prefix.join(child.name());
        match child {
            Node::Tree(sub) => collect_objects(sub, &path, out),
            Node::Object(object) => out.push((path, object)),
        }
    }
}

/// Content identity of a whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeDigest(ContentId);

impl fmt::Display for TreeDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Typed bookmark tree.
//!
//! The on-disk store is a JSON document whose `roots` object holds one folder
//! per root (`bookmark_bar`, `other`, `synced`, ...). Each node carries a
//! `type` discriminator of `url` or `folder`; anything else (including a
//! missing discriminator) decodes to [`BookmarkNode::Unknown`] so newer node
//! shapes pass through without failing the whole load.
//!
//! Timestamps stay in their raw textual form here. They are validated and
//! converted by the flattener, which owns the `MalformedTimestamp` policy.

use serde::de::Deserializer;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::FlattenError;

/// Raw vendor-epoch timestamp exactly as it appears in the store.
///
/// The vendor format writes these as decimal strings; bare JSON numbers are
/// accepted as well. Any other JSON shape is kept as its JSON text and will be
/// rejected when parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTimestamp(pub String);

impl RawTimestamp {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawTimestamp {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for RawTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let text = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(Self(text))
    }
}

/// Optional per-url metadata. Only the visit-time keys are interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetaInfo {
    #[serde(default)]
    pub last_visited_desktop: Option<RawTimestamp>,
    #[serde(default)]
    pub last_visited: Option<RawTimestamp>,
}

/// A bookmarked page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UrlNode {
    pub id: String,
    pub name: String,
    pub url: String,
    pub date_added: RawTimestamp,
    #[serde(default)]
    pub date_last_used: Option<RawTimestamp>,
    #[serde(default)]
    pub meta_info: Option<MetaInfo>,
}

/// A folder and the children it exclusively owns, in stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub children: Vec<BookmarkNode>,
}

/// One node of the bookmark tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkNode {
    Url(UrlNode),
    Folder(FolderNode),
    /// Missing or unrecognised `type`; skipped by traversal.
    Unknown,
}

#[derive(Deserialize)]
struct FolderFields {
    id: String,
    name: String,
}

/// Stack kept free before descending into a child node.
pub(crate) const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each extra stack segment allocated for deep trees.
pub(crate) const STACK_SEGMENT: usize = 1024 * 1024;

impl BookmarkNode {
    /// Decode a node from JSON. `path` names the node in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::MalformedTree`] when the value is not an
    /// object, or when a `url`/`folder` node lacks a required field.
    pub fn from_value(value: Value, path: &str) -> Result<Self, FlattenError> {
        let Value::Object(map) = value else {
            return Err(FlattenError::tree(format!("node at {path} is not an object")));
        };

        match map.get("type").and_then(Value::as_str) {
            Some("url") => serde_json::from_value::<UrlNode>(Value::Object(map))
                .map(Self::Url)
                .map_err(|err| FlattenError::tree(format!("url node at {path}: {err}"))),
            Some("folder") => decode_folder(map, path).map(Self::Folder),
            _ => Ok(Self::Unknown),
        }
    }

    /// Node id, when the node shape is recognised.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(&url.id),
            Self::Folder(folder) => Some(&folder.id),
            Self::Unknown => None,
        }
    }
}

fn decode_folder(mut map: Map<String, Value>, path: &str) -> Result<FolderNode, FlattenError> {
    // Children are taken out before the shallow fields are decoded so the
    // subtree is moved, not copied, on every level.
    let children = match map.remove("children") {
        Some(Value::Array(children)) => children,
        Some(_) => {
            return Err(FlattenError::tree(format!(
                "folder node at {path}: `children` is not an array"
            )));
        }
        None => {
            return Err(FlattenError::tree(format!(
                "folder node at {path}: missing field `children`"
            )));
        }
    };
    let fields: FolderFields = serde_json::from_value(Value::Object(map))
        .map_err(|err| FlattenError::tree(format!("folder node at {path}: {err}")))?;

    let children = children
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
                BookmarkNode::from_value(child, &format!("{path}/{i}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(FolderNode {
        id: fields.id,
        name: fields.name,
        children,
    })
}

/// A named entry of the top-level `roots` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRoot {
    pub key: String,
    pub node: BookmarkNode,
}

/// A parsed bookmark store: its roots in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkStore {
    pub roots: Vec<BookmarkRoot>,
}

impl BookmarkStore {
    /// Parse a store from raw bytes (UTF-8 JSON).
    ///
    /// # Errors
    ///
    /// [`FlattenError::InvalidJson`] for syntax errors and
    /// [`FlattenError::MalformedTree`] for structural problems.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FlattenError> {
        let doc = parse_document(serde_json::Deserializer::from_slice(bytes))?;
        Self::from_document(doc)
    }

    /// Parse a store from a JSON string.
    ///
    /// # Errors
    ///
    /// Same as [`BookmarkStore::from_slice`].
    pub fn from_json_str(text: &str) -> Result<Self, FlattenError> {
        let doc = parse_document(serde_json::Deserializer::from_str(text))?;
        Self::from_document(doc)
    }

    /// Build a store from an already-parsed JSON document.
    ///
    /// # Errors
    ///
    /// [`FlattenError::MalformedTree`] if `roots` is missing or not an object,
    /// or if any recognised node is malformed.
    pub fn from_document(doc: Value) -> Result<Self, FlattenError> {
        let Value::Object(mut doc) = doc else {
            return Err(FlattenError::tree("top level is not an object"));
        };
        let Some(roots) = doc.remove("roots") else {
            return Err(FlattenError::tree("missing `roots`"));
        };
        let Value::Object(roots) = roots else {
            return Err(FlattenError::tree("`roots` is not an object"));
        };

        let roots = roots
            .into_iter()
            .map(|(key, value)| {
                let node = BookmarkNode::from_value(value, &key)?;
                Ok(BookmarkRoot { key, node })
            })
            .collect::<Result<Vec<_>, FlattenError>>()?;

        Ok(Self { roots })
    }
}

/// Parse a whole JSON document with no nesting limit.
///
/// Folder depth is only bounded by the input, so the parser's recursion
/// limit is lifted and the stack grows on demand instead.
fn parse_document<'de, R>(mut de: serde_json::Deserializer<R>) -> Result<Value, serde_json::Error>
where
    R: serde_json::de::Read<'de>,
{
    de.disable_recursion_limit();
    let doc = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(doc)
}

#[cfg(test)]
pub(crate) fn nested_folders(depth: usize) -> String {
    let mut text = String::from(
        r#"{"type": "url", "id": "leaf", "name": "deep", "url": "https://example.com/", "date_added": "13276182896789012"}"#,
    );
    for level in (0..depth).rev() {
        text = format!(r#"{{"type": "folder", "id": "f{level}", "name": "L{level}", "children": [{text}]}}"#);
    }
    format!(r#"{{"roots": {{"other": {text}}}}}"#)
}

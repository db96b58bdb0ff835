//! Tree flattener.
//!
//! Walks a [`BookmarkStore`] depth-first in pre-order (roots in document
//! order, a folder before its children, children in stored order) and emits:
//!
//! - one [`UrlRecord`] per `url` node, with both timestamps converted from the
//!   vendor epoch and `last_visited` resolved by source precedence;
//! - one [`FolderRecord`] per `folder` node, emitted before its children.
//!
//! Unknown node shapes are skipped. Any malformed timestamp aborts the whole
//! flatten; callers never see a partial record set. Nesting depth is not
//! capped: the walk grows its stack as deep folders require.
//!
//! # Last-visited precedence
//!
//! 1. `date_last_used`
//! 2. `meta_info.last_visited_desktop`
//! 3. `meta_info.last_visited`
//!
//! The first source holding a positive integer wins. Absent sources, empty
//! strings, and `0` fall through to the next source; if none qualifies the
//! record has no `last_visited`. Sources after the winner are not inspected.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::epoch::{from_vendor_epoch, parse_vendor_micros};
use crate::error::FlattenError;
use crate::model::node::{STACK_RED_ZONE, STACK_SEGMENT};
use crate::model::{BookmarkNode, BookmarkStore, FolderRecord, RawTimestamp, UrlNode, UrlRecord};

/// Output of [`flatten`]: url records and folder records in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flattened {
    pub urls: Vec<UrlRecord>,
    pub folders: Vec<FolderRecord>,
}

/// The folder a node is being visited under.
#[derive(Clone, Copy)]
struct Enclosing<'a> {
    id: Option<&'a str>,
    name: &'a str,
    depth: usize,
}

/// Flatten a parsed store.
///
/// # Errors
///
/// [`FlattenError::MalformedTimestamp`] if any url node carries a timestamp
/// that is present but not a non-negative integer in range.
#[instrument(skip_all, fields(roots = store.roots.len()))]
pub fn flatten(store: &BookmarkStore) -> Result<Flattened, FlattenError> {
    let mut out = Flattened::default();
    for root in &store.roots {
        let enclosing = Enclosing {
            id: None,
            name: &root.key,
            depth: 0,
        };
        visit(&root.node, enclosing, &mut out)?;
    }

    debug!(
        urls = out.urls.len(),
        folders = out.folders.len(),
        "flattened bookmark store"
    );
    Ok(out)
}

/// Parse and flatten a store from raw bytes.
///
/// # Errors
///
/// Any parse error from [`BookmarkStore::from_slice`] or flatten error from
/// [`flatten`].
pub fn flatten_bytes(bytes: &[u8]) -> Result<Flattened, FlattenError> {
    let store = BookmarkStore::from_slice(bytes)?;
    flatten(&store)
}

/// Read a bookmark file from disk and flatten it.
///
/// # Errors
///
/// [`FlattenError::Io`] if the file cannot be read, otherwise as
/// [`flatten_bytes`].
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_bookmarks(path: impl AsRef<Path>) -> Result<Flattened, FlattenError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| FlattenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(bytes = bytes.len(), "read bookmark file");
    flatten_bytes(&bytes)
}

fn visit(node: &BookmarkNode, enclosing: Enclosing<'_>, out: &mut Flattened) -> Result<(), FlattenError> {
    match node {
        BookmarkNode::Url(url) => {
            out.urls.push(url_record(url, enclosing.name)?);
        }
        BookmarkNode::Folder(folder) => {
            out.folders.push(FolderRecord {
                id: folder.id.clone(),
                name: folder.name.clone(),
                parent_id: enclosing.id.map(str::to_string),
                depth: enclosing.depth,
            });

            let inner = Enclosing {
                id: Some(&folder.id),
                name: &folder.name,
                depth: enclosing.depth + 1,
            };
            for child in &folder.children {
                stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || visit(child, inner, out))?;
            }
        }
        BookmarkNode::Unknown => {}
    }
    Ok(())
}

fn url_record(node: &UrlNode, folder_name: &str) -> Result<UrlRecord, FlattenError> {
    let date_added = convert(&node.id, "date_added", &node.date_added)?;
    let last_visited = resolve_last_visited(node)?;

    Ok(UrlRecord {
        id: node.id.clone(),
        name: node.name.clone(),
        url: node.url.clone(),
        folder_name: folder_name.to_string(),
        date_added,
        last_visited,
    })
}

fn resolve_last_visited(node: &UrlNode) -> Result<Option<DateTime<Utc>>, FlattenError> {
    let meta = node.meta_info.as_ref();
    let sources = [
        ("date_last_used", node.date_last_used.as_ref()),
        (
            "meta_info.last_visited_desktop",
            meta.and_then(|m| m.last_visited_desktop.as_ref()),
        ),
        ("meta_info.last_visited", meta.and_then(|m| m.last_visited.as_ref())),
    ];

    for (field, raw) in sources {
        let Some(raw) = raw else {
            continue;
        };
        if raw.as_str().trim().is_empty() {
            continue;
        }
        let micros = parse_micros(&node.id, field, raw)?;
        if micros == 0 {
            continue;
        }
        return to_datetime(&node.id, field, raw, micros).map(Some);
    }

    Ok(None)
}

fn convert(id: &str, field: &str, raw: &RawTimestamp) -> Result<DateTime<Utc>, FlattenError> {
    let micros = parse_micros(id, field, raw)?;
    to_datetime(id, field, raw, micros)
}

fn parse_micros(id: &str, field: &str, raw: &RawTimestamp) -> Result<u64, FlattenError> {
    parse_vendor_micros(raw.as_str()).ok_or_else(|| malformed(id, field, raw))
}

fn to_datetime(
    id: &str,
    field: &str,
    raw: &RawTimestamp,
    micros: u64,
) -> Result<DateTime<Utc>, FlattenError> {
    from_vendor_epoch(micros).ok_or_else(|| malformed(id, field, raw))
}

fn malformed(id: &str, field: &str, raw: &RawTimestamp) -> FlattenError {
    FlattenError::MalformedTimestamp {
        id: id.to_string(),
        field: field.to_string(),
        raw: raw.as_str().to_string(),
    }
}

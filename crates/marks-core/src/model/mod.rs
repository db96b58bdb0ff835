//! Bookmark data model.
//!
//! - [`node`]: the typed input tree decoded from the store's JSON.
//! - [`record`]: the flat output records produced by the flattener.

pub mod node;
pub mod record;

pub use node::{BookmarkNode, BookmarkRoot, BookmarkStore, FolderNode, MetaInfo, RawTimestamp, UrlNode};
pub use record::{FolderRecord, UrlRecord};

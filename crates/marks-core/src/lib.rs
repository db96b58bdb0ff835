#![forbid(unsafe_code)]
//! marks-core library.
//!
//! Parses a browser bookmark store into a typed tree ([`model::BookmarkStore`])
//! and flattens it into canonical [`model::UrlRecord`] and
//! [`model::FolderRecord`] sequences.
//!
//! # Conventions
//!
//! - **Errors**: library errors are `thiserror` enums ([`error::FlattenError`],
//!   [`cache::CacheError`]); `anyhow::Result` is used for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod cache;
pub mod config;
pub mod epoch;
pub mod error;
pub mod flatten;
pub mod model;
pub mod site;

pub use error::{ErrorCode, FlattenError};
pub use flatten::{Flattened, flatten, flatten_bytes, load_bookmarks};
pub use model::{BookmarkNode, BookmarkStore, FolderRecord, UrlRecord};

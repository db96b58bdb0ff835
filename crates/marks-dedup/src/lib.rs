#![forbid(unsafe_code)]
//! marks-dedup library.
//!
//! Groups bookmark records into duplicate partitions. [`partition`] holds the
//! generic transitive partition finder; [`similarity`] the fuzzy name score
//! used as its predicate; [`records`] ties both to [`marks_core::UrlRecord`].
//!
//! # Conventions
//!
//! - **Errors**: the finder is infallible unless the caller's predicate is;
//!   the `try_*` variants propagate the predicate's own error type.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod partition;
pub mod records;
pub mod similarity;

pub use partition::{
    Partitions, find_partitions, find_partitions_blocked, try_find_partitions,
    try_find_partitions_blocked,
};
pub use records::{DuplicateGroup, duplicate_groups, partition_records};
pub use similarity::{NameMatcher, partial_ratio};

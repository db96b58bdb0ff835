//! Duplicate partitioning of flattened bookmark records.
//!
//! Glues [`NameMatcher`] and the optional exact-key blocking from
//! [`DedupConfig`] onto the generic partition finder.

use marks_core::UrlRecord;
use marks_core::config::{BlockBy, DedupConfig};
use marks_core::site::site_key;
use tracing::instrument;

use crate::partition::{Partitions, find_partitions, find_partitions_blocked};
use crate::similarity::NameMatcher;

/// Exact key a record is blocked under.
#[must_use]
pub fn block_key(block_by: BlockBy, record: &UrlRecord) -> String {
    match block_by {
        BlockBy::None => String::new(),
        BlockBy::Folder => record.folder_name.clone(),
        BlockBy::Site => site_key(&record.url),
    }
}

/// Partition `records` so that transitively similar names share an id.
#[instrument(skip_all, fields(records = records.len(), threshold = config.threshold))]
pub fn partition_records(records: &[UrlRecord], config: &DedupConfig) -> Partitions {
    let matcher = NameMatcher::new(config.threshold);
    let is_match = |a: &UrlRecord, b: &UrlRecord| matcher.is_same(a, b);
    match config.block_by {
        BlockBy::None => find_partitions(records, is_match, config.max_size),
        block_by => find_partitions_blocked(records, is_match, config.max_size, |record| {
            block_key(block_by, record)
        }),
    }
}

/// A partition with more than one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup<'r> {
    pub partition: usize,
    pub records: Vec<&'r UrlRecord>,
}

/// Duplicate groups, largest first; ties keep partition order.
#[must_use]
pub fn duplicate_groups<'r>(records: &'r [UrlRecord], partitions: &Partitions) -> Vec<DuplicateGroup<'r>> {
    let mut groups: Vec<DuplicateGroup<'r>> = partitions
        .duplicate_groups()
        .into_iter()
        .map(|(partition, members)| DuplicateGroup {
            partition,
            records: members.into_iter().map(|position| &records[position]).collect(),
        })
        .collect();
    groups.sort_by(|a, b| b.records.len().cmp(&a.records.len()));
    groups
}

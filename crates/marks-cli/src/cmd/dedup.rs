//! `marks dedup`: near-duplicate bookmark detection.
//!
//! Partitions every url record so that names linked by a chain of fuzzy
//! matches share a partition, then reports partitions with more than one
//! member (or, with `--assign`, every record's partition id).

use std::io::{self, Write};

use clap::{Args, ValueEnum};
use marks_core::UrlRecord;
use marks_core::config::{BlockBy, DedupConfig};
use marks_dedup::{duplicate_groups, partition_records};
use serde::Serialize;
use tracing::info;

use crate::cmd::Session;
use crate::output::{render, render_mode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlockByArg {
    /// Compare every pair of records.
    None,
    /// Only compare records in the same folder.
    Folder,
    /// Only compare records on the same site.
    Site,
}

impl From<BlockByArg> for BlockBy {
    fn from(arg: BlockByArg) -> Self {
        match arg {
            BlockByArg::None => Self::None,
            BlockByArg::Folder => Self::Folder,
            BlockByArg::Site => Self::Site,
        }
    }
}

#[derive(Args, Debug, Default)]
#[command(
    about = "Find near-duplicate bookmarks",
    long_about = "Group bookmarks whose names are transitively similar.\n\n\
                  Two names match when their partial-ratio score (0-100) is\
                  strictly above the threshold.",
    after_help = "EXAMPLES:\n    # Report duplicate groups\n    marks dedup\n\n\
                  # Stricter matching, only within the same site\n    marks dedup --threshold 95 --block-by site\n\n\
                  # Every record with its partition id\n    marks dedup --assign --json"
)]
pub struct DedupArgs {
    /// Partial-ratio score a name pair must exceed to match (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Maximum records per partition.
    #[arg(long)]
    pub max_size: Option<usize>,

    /// Only compare records sharing this key.
    #[arg(long, value_enum)]
    pub block_by: Option<BlockByArg>,

    /// List every record with its partition id instead of duplicate groups.
    #[arg(long)]
    pub assign: bool,

    /// Maximum number of duplicate groups to report.
    #[arg(long)]
    pub limit: Option<usize>,
}

impl DedupArgs {
    /// Flags override the `[dedup]` config section field by field.
    fn effective_config(&self, base: &DedupConfig) -> DedupConfig {
        DedupConfig {
            threshold: self.threshold.unwrap_or(base.threshold),
            max_size: self.max_size.or(base.max_size),
            block_by: self.block_by.map_or(base.block_by, BlockBy::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupItem {
    pub id: String,
    pub name: String,
    pub url: String,
    pub folder_name: String,
}

impl From<&UrlRecord> for GroupItem {
    fn from(record: &UrlRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            url: record.url.clone(),
            folder_name: record.folder_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupGroupOutput {
    pub partition: usize,
    pub items: Vec<GroupItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupReport {
    pub records: usize,
    pub partitions: usize,
    pub comparisons: u64,
    pub groups: Vec<DedupGroupOutput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: String,
    pub partition: usize,
    pub name: String,
    pub url: String,
}

pub fn run_dedup(args: &DedupArgs, session: &Session) -> anyhow::Result<()> {
    let urls = session.load()?.urls;
    let config = args.effective_config(&session.config.dedup);
    info!(
        threshold = config.threshold,
        max_size = ?config.max_size,
        block_by = ?config.block_by,
        "partitioning bookmarks"
    );

    if args.assign {
        let assignments = assign(&urls, &config);
        return render_mode(session.output, &assignments, render_assign_text, render_assign_human);
    }

    let report = build_report(&urls, &config, args.limit);
    render(session.output, &report, render_human)
}

pub fn build_report(urls: &[UrlRecord], config: &DedupConfig, limit: Option<usize>) -> DedupReport {
    let partitions = partition_records(urls, config);
    let mut groups: Vec<DedupGroupOutput> = duplicate_groups(urls, &partitions)
        .into_iter()
        .map(|group| DedupGroupOutput {
            partition: group.partition,
            items: group.records.into_iter().map(GroupItem::from).collect(),
        })
        .collect();
    if let Some(limit) = limit {
        groups.truncate(limit);
    }

    DedupReport {
        records: partitions.len(),
        partitions: partitions.partition_count(),
        comparisons: partitions.comparisons(),
        groups,
    }
}

pub fn assign(urls: &[UrlRecord], config: &DedupConfig) -> Vec<Assignment> {
    let partitions = partition_records(urls, config);
    urls.iter()
        .zip(partitions.as_slice())
        .map(|(record, &partition)| Assignment {
            id: record.id.clone(),
            partition,
            name: record.name.clone(),
            url: record.url.clone(),
        })
        .collect()
}

fn render_human(report: &DedupReport, w: &mut dyn Write) -> io::Result<()> {
    if report.groups.is_empty() {
        writeln!(w, "No duplicate groups found among {} bookmarks.", report.records)?;
        return Ok(());
    }

    writeln!(
        w,
        "{} duplicate group(s) among {} bookmarks:",
        report.groups.len(),
        report.records
    )?;
    for (i, group) in report.groups.iter().enumerate() {
        writeln!(w, "\n{}. partition {} ({} items)", i + 1, group.partition, group.items.len())?;
        for item in &group.items {
            writeln!(w, "  - {}  {}  [{}]", item.id, item.name, item.folder_name)?;
            writeln!(w, "      {}", item.url)?;
        }
    }
    Ok(())
}

fn render_assign_text(rows: &Vec<Assignment>, w: &mut dyn Write) -> io::Result<()> {
    for row in rows {
        writeln!(w, "{}\t{}\t{}\t{}", row.partition, row.id, row.name, row.url)?;
    }
    Ok(())
}

fn render_assign_human(rows: &Vec<Assignment>, w: &mut dyn Write) -> io::Result<()> {
    for row in rows {
        writeln!(w, "{:>5}  {:<8} {}", row.partition, row.id, row.name)?;
    }
    Ok(())
}

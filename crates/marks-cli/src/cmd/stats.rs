//! `marks stats`: bookmark collection reporting.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use marks_core::Flattened;
use marks_core::site::site_key;
use serde::Serialize;

use crate::cmd::Session;
use crate::output::{pretty_kv, pretty_section, render};

/// Arguments for `marks stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// How many sites to list, most bookmarked first.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

/// A key with its record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub key: String,
    pub count: usize,
}

/// Report payload for `marks stats`.
#[derive(Debug, Serialize)]
pub struct BookmarkStats {
    pub urls: usize,
    pub folders: usize,
    pub missing_last_visited: usize,
    pub added_last_7d: usize,
    pub by_folder: Vec<Count>,
    pub top_sites: Vec<Count>,
    /// `YYYY-MM` → urls added that month.
    pub added_by_month: BTreeMap<String, usize>,
    /// `YYYY-MM` → urls last visited that month.
    pub visited_by_month: BTreeMap<String, usize>,
}

/// Execute `marks stats`.
pub fn run_stats(args: &StatsArgs, session: &Session) -> anyhow::Result<()> {
    let flattened = session.load()?;
    let payload = compute_stats(&flattened, args.top, Utc::now());
    render(session.output, &payload, |payload, w| render_stats_human(payload, w))
}

pub fn compute_stats(flattened: &Flattened, top: usize, now: DateTime<Utc>) -> BookmarkStats {
    let week_ago = now - Duration::days(7);
    let mut by_folder: HashMap<&str, usize> = HashMap::new();
    let mut by_site: HashMap<String, usize> = HashMap::new();
    let mut added_by_month = BTreeMap::new();
    let mut visited_by_month = BTreeMap::new();
    let mut missing_last_visited = 0;
    let mut added_last_7d = 0;

    for url in &flattened.urls {
        *by_folder.entry(url.folder_name.as_str()).or_default() += 1;
        *by_site.entry(site_key(&url.url)).or_default() += 1;
        *added_by_month
            .entry(url.date_added.format("%Y-%m").to_string())
            .or_default() += 1;
        match url.last_visited {
            Some(at) => {
                *visited_by_month.entry(at.format("%Y-%m").to_string()).or_default() += 1;
            }
            None => missing_last_visited += 1,
        }
        if url.date_added >= week_ago {
            added_last_7d += 1;
        }
    }

    let mut top_sites = sorted_counts(by_site.iter().map(|(k, v)| (k.as_str(), *v)));
    top_sites.truncate(top);

    BookmarkStats {
        urls: flattened.urls.len(),
        folders: flattened.folders.len(),
        missing_last_visited,
        added_last_7d,
        by_folder: sorted_counts(by_folder.into_iter()),
        top_sites,
        added_by_month,
        visited_by_month,
    }
}

/// Highest count first; ties broken by key.
fn sorted_counts<'a>(counts: impl Iterator<Item = (&'a str, usize)>) -> Vec<Count> {
    let mut entries: Vec<Count> = counts
        .map(|(key, count)| Count {
            key: key.to_string(),
            count,
        })
        .collect();
    entries.sort_unstable_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries
}

fn render_stats_human(stats: &BookmarkStats, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Bookmarks")?;
    pretty_kv(w, "urls", stats.urls.to_string())?;
    pretty_kv(w, "folders", stats.folders.to_string())?;
    pretty_kv(w, "never visited", stats.missing_last_visited.to_string())?;
    pretty_kv(w, "added (7d)", stats.added_last_7d.to_string())?;

    writeln!(w, "\nUrls by folder:")?;
    for Count { key, count } in &stats.by_folder {
        writeln!(w, "  {key}: {count}")?;
    }

    writeln!(w, "\nTop sites:")?;
    for Count { key, count } in &stats.top_sites {
        writeln!(w, "  {key}: {count}")?;
    }

    writeln!(w, "\nAdded per month:")?;
    for (month, count) in &stats.added_by_month {
        writeln!(w, "  {month}: {count}")?;
    }

    writeln!(w, "\nLast visited per month:")?;
    for (month, count) in &stats.visited_by_month {
        writeln!(w, "  {month}: {count}")?;
    }

    Ok(())
}

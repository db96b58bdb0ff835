//! `marks urls`: flat listing of bookmarked urls.

use std::io::{self, Write};

use clap::Args;
use marks_core::UrlRecord;

use crate::cmd::Session;
use crate::output::{render_mode, pretty_section};

/// Arguments for `marks urls`.
#[derive(Args, Debug, Default)]
pub struct UrlsArgs {
    /// Keep urls whose address or name contains this text (case-sensitive).
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Keep urls whose enclosing folder has exactly this name.
    #[arg(long)]
    pub folder: Option<String>,

    /// Show at most this many urls.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// Execute `marks urls`.
pub fn run_urls(args: &UrlsArgs, session: &Session) -> anyhow::Result<()> {
    let flattened = session.load()?;
    let urls = select_urls(flattened.urls, args);
    render_mode(session.output, &urls, render_text, render_pretty)
}

/// Apply filters, order by `date_added`, then truncate.
///
/// The sort is stable, so urls added at the same instant keep tree order.
pub fn select_urls(urls: Vec<UrlRecord>, args: &UrlsArgs) -> Vec<UrlRecord> {
    let mut selected: Vec<UrlRecord> = urls
        .into_iter()
        .filter(|u| {
            args.search
                .as_deref()
                .is_none_or(|q| u.url.contains(q) || u.name.contains(q))
        })
        .filter(|u| args.folder.as_deref().is_none_or(|f| u.folder_name == f))
        .collect();
    selected.sort_by_key(|u| u.date_added);
    if let Some(limit) = args.limit {
        selected.truncate(limit);
    }
    selected
}

fn render_text(urls: &Vec<UrlRecord>, w: &mut dyn Write) -> io::Result<()> {
    for u in urls {
        let visited = u.last_visited.map(|at| at.to_rfc3339()).unwrap_or_default();
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            u.id,
            u.date_added.to_rfc3339(),
            visited,
            u.folder_name,
            u.name,
            u.url
        )?;
    }
    Ok(())
}

fn render_pretty(urls: &Vec<UrlRecord>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("{} urls", urls.len()))?;
    for u in urls {
        let visited = u
            .last_visited
            .map_or_else(|| "never".to_string(), |at| at.format("%Y-%m-%d").to_string());
        writeln!(
            w,
            "{}  {:<10}  {:<20}  {}",
            u.date_added.format("%Y-%m-%d"),
            visited,
            u.folder_name,
            u.name
        )?;
        writeln!(w, "{:>36}{}", "", u.url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn url(id: &str, name: &str, folder: &str, day: u32) -> UrlRecord {
        UrlRecord {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("https://example.com/{id}"),
            folder_name: folder.to_string(),
            date_added: Utc.with_ymd_and_hms(2022, 5, day, 0, 0, 0).unwrap(),
            last_visited: None,
        }
    }

    fn fixture() -> Vec<UrlRecord> {
        vec![
            url("a", "Rust blog", "Rust", 3),
            url("b", "Tokio", "Async", 1),
            url("c", "rustup", "Rust", 2),
            url("d", "Same day", "Other", 1),
        ]
    }

    fn ids(urls: &[UrlRecord]) -> Vec<&str> {
        urls.iter().map(|u| u.id.as_str()).collect()
    }

    #[test]
    fn sorted_by_date_added_stably() {
        let selected = select_urls(fixture(), &UrlsArgs::default());
        assert_eq!(ids(&selected), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn search_is_case_sensitive_on_name_or_url() {
        let args = UrlsArgs {
            search: Some("Rust".into()),
            ..UrlsArgs::default()
        };
        assert_eq!(ids(&select_urls(fixture(), &args)), vec!["a"]);

        let args = UrlsArgs {
            search: Some("example.com/c".into()),
            ..UrlsArgs::default()
        };
        assert_eq!(ids(&select_urls(fixture(), &args)), vec!["c"]);
    }

    #[test]
    fn folder_filter_and_limit() {
        let args = UrlsArgs {
            folder: Some("Rust".into()),
            limit: Some(1),
            ..UrlsArgs::default()
        };
        assert_eq!(ids(&select_urls(fixture(), &args)), vec!["c"]);
    }

    #[test]
    fn text_rows_are_tab_separated() {
        let mut buf = Vec::new();
        render_text(&vec![url("a", "Rust blog", "Rust", 3)], &mut buf).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert_eq!(line.trim_end().split('\t').count(), 6);
        assert!(line.starts_with("a\t2022-05-03T00:00:00+00:00\t\tRust\tRust blog\t"));
    }
}

//! Site key derivation for grouping bookmarks.
//!
//! A site key is the url's host with common vanity subdomains removed, with a
//! few aliases folded together. Reddit links keep their subreddit so that
//! `reddit.com/r/rust` and `reddit.com/r/golang` count as separate sites.

use url::Url;

/// Leading host labels stripped, in order, each at most once.
const STRIPPED_PREFIXES: &[&str] = &["en.", "old.", "blog.", "gist.", "www.", "m.", "mobile."];

/// Hosts that are mirrors of another site.
const ALIASES: &[(&str, &str)] = &[("greaterwrong.com", "lesswrong.com")];

/// Derive the site key for a bookmarked url.
///
/// Urls without a host, or that fail to parse, all share the empty key.
#[must_use]
pub fn site_key(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    let mut host = host;
    for prefix in STRIPPED_PREFIXES {
        host = host.strip_prefix(prefix).unwrap_or(host);
    }

    if let Some((_, canonical)) = ALIASES.iter().find(|(alias, _)| *alias == host) {
        return (*canonical).to_string();
    }

    if host == "reddit.com" {
        let segments: Vec<&str> = parsed
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .take(2)
            .collect();
        if segments.is_empty() {
            return host.to_string();
        }
        return format!("{host}/{}", segments.join("/"));
    }

    host.to_string()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookmarked url, flattened out of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Name of the immediately enclosing folder (not a path).
    pub folder_name: String,
    pub date_added: DateTime<Utc>,
    /// First positive visit time by precedence; `None` when no source has one.
    pub last_visited: Option<DateTime<Utc>>,
}

/// A folder, in pre-order discovery position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    /// Enclosing folder id; `None` for store roots.
    pub parent_id: Option<String>,
    /// Nesting depth; store roots are at depth 0.
    pub depth: usize,
}

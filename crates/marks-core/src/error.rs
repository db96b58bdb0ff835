use std::fmt;
use std::io;
use std::path::PathBuf;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BookmarksNotFound,
    ConfigParseError,
    MalformedTree,
    MalformedTimestamp,
    InvalidJson,
    CacheWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BookmarksNotFound => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MalformedTree => "E2001",
            Self::MalformedTimestamp => "E2002",
            Self::InvalidJson => "E2003",
            Self::CacheWriteFailed => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BookmarksNotFound => "Bookmark file not readable",
            Self::ConfigParseError => "Config file parse error",
            Self::MalformedTree => "Malformed bookmark tree",
            Self::MalformedTimestamp => "Malformed bookmark timestamp",
            Self::InvalidJson => "Bookmark file is not valid JSON",
            Self::CacheWriteFailed => "Flatten cache write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::BookmarksNotFound => {
                Some("Pass --file or set MARKS_BOOKMARKS to the browser's Bookmarks file.")
            }
            Self::ConfigParseError => Some("Fix syntax in ~/.config/marks/config.toml and retry."),
            Self::MalformedTree => Some("Check that the file is a browser Bookmarks export with a `roots` object."),
            Self::MalformedTimestamp => {
                Some("Timestamps must be microseconds since 1601-01-01 as a non-negative integer.")
            }
            Self::InvalidJson => Some("Make sure the browser is not mid-write; retry or restore a backup."),
            Self::CacheWriteFailed => Some("Check write permissions for the cache directory, or pass --no-cache."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while reading, parsing, or flattening a bookmark store.
///
/// Flattening is all-or-nothing: any of these aborts the whole operation and
/// no partial record set is returned.
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    /// The bookmark file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input is not a JSON document at all.
    #[error("bookmark file is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Structurally invalid input: missing `roots`, a node that is not an
    /// object, or a recognised node missing a required field.
    #[error("malformed bookmark tree: {0}")]
    MalformedTree(String),

    /// A timestamp-bearing field is present but is not a non-negative
    /// integer within the representable range.
    #[error("malformed timestamp in `{field}` of bookmark {id}: '{raw}'")]
    MalformedTimestamp {
        /// Id of the url node carrying the field.
        id: String,
        /// Field path, e.g. `meta_info.last_visited`.
        field: String,
        /// The offending raw value.
        raw: String,
    },
}

impl FlattenError {
    /// Map this error onto its stable [`ErrorCode`].
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::BookmarksNotFound,
            Self::InvalidJson(_) => ErrorCode::InvalidJson,
            Self::MalformedTree(_) => ErrorCode::MalformedTree,
            Self::MalformedTimestamp { .. } => ErrorCode::MalformedTimestamp,
        }
    }

    /// Remediation suggestion for terminal output.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or_else(|| self.error_code().message())
            .to_string()
    }

    pub(crate) fn tree(detail: impl Into<String>) -> Self {
        Self::MalformedTree(detail.into())
    }
}

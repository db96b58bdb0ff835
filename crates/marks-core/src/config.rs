use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the bookmark file location.
pub const BOOKMARKS_ENV: &str = "MARKS_BOOKMARKS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Bookmark file to read when no `--file` is given.
    #[serde(default)]
    pub bookmarks: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Which exact key, if any, pre-partitions records before fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockBy {
    #[default]
    None,
    Folder,
    Site,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    /// Partial-ratio score a name pair must exceed to match (0-100).
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default)]
    pub max_size: Option<usize>,
    #[serde(default)]
    pub block_by: BlockBy,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_size: None,
            block_by: BlockBy::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// Location of the user config file, `$CONFIG_DIR/marks/config.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("marks/config.toml"))
}

/// Load the user config from its default location.
///
/// A missing file (or a platform without a config directory) yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load a config file from an explicit path; missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Default bookmark location of a desktop Chrome profile.
#[must_use]
pub fn default_bookmarks_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("google-chrome/Default/Bookmarks"))
}

/// Resolve which bookmark file to read.
///
/// Precedence: explicit flag, then `MARKS_BOOKMARKS`, then the config file,
/// then the default Chrome profile location.
#[must_use]
pub fn resolve_bookmarks_path(flag: Option<&Path>, config: &UserConfig) -> Option<PathBuf> {
    let env_path = env::var_os(BOOKMARKS_ENV).map(PathBuf::from);
    resolve_bookmarks_path_inner(flag, env_path, config.bookmarks.clone(), default_bookmarks_path())
}

fn resolve_bookmarks_path_inner(
    flag: Option<&Path>,
    env_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    fallback: Option<PathBuf>,
) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| env_path.filter(|p| !p.as_os_str().is_empty()))
        .or(config_path)
        .or(fallback)
}

const fn default_true() -> bool {
    true
}

const fn default_threshold() -> u8 {
    90
}

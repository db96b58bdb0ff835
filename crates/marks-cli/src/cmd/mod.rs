pub mod completions;
pub mod dedup;
pub mod folders;
pub mod stats;
pub mod urls;

use std::path::{Path, PathBuf};

use marks_core::cache::FlattenCache;
use marks_core::config::{UserConfig, resolve_bookmarks_path};
use marks_core::{ErrorCode, Flattened, load_bookmarks};
use tracing::{debug, info};

use crate::output::{CliError, OutputMode, render_error};

/// Per-invocation state shared by every command that reads bookmarks.
#[derive(Debug)]
pub struct Session {
    pub config: UserConfig,
    pub file: Option<PathBuf>,
    pub no_cache: bool,
    pub output: OutputMode,
}

impl Session {
    /// Resolve, read, and flatten the bookmark file.
    ///
    /// Failures are rendered to stderr in the session's output mode before
    /// being returned.
    pub fn load(&self) -> anyhow::Result<Flattened> {
        let Some(path) = resolve_bookmarks_path(self.file.as_deref(), &self.config) else {
            render_error(
                self.output,
                &CliError::from_code(
                    ErrorCode::BookmarksNotFound,
                    "no bookmark file location could be determined",
                ),
            )?;
            anyhow::bail!("bookmark file location unknown");
        };

        match self.load_from(&path) {
            Ok(flattened) => {
                info!(
                    path = %path.display(),
                    urls = flattened.urls.len(),
                    folders = flattened.folders.len(),
                    "loaded bookmarks"
                );
                Ok(flattened)
            }
            Err(err) => {
                render_error(self.output, &CliError::from(&err))?;
                Err(err.into())
            }
        }
    }

    fn load_from(&self, path: &Path) -> Result<Flattened, marks_core::FlattenError> {
        let cache = if self.no_cache || !self.config.cache.enabled {
            None
        } else {
            FlattenCache::in_user_cache_dir()
        };

        match cache {
            Some(cache) => {
                let loaded = cache.load(path)?;
                debug!(source = ?loaded.source, "flatten cache");
                Ok(loaded.flattened)
            }
            None => load_bookmarks(path),
        }
    }
}

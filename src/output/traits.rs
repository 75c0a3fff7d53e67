//! Output writer trait and error types

use crate::crawler::CrawlReport;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        OutputError::Write {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        OutputError::Read {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Something that turns a finished crawl into files
pub trait ReportWriter {
    /// Writes this writer's reports
    ///
    /// # Returns
    ///
    /// Paths of the files written
    fn write(&self, report: &CrawlReport) -> OutputResult<Vec<PathBuf>>;
}

/// Writes `content` to `path`, creating parent directories as needed
pub(crate) fn write_file(path: &Path, content: &str) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::write(parent, e))?;
        }
    }

    std::fs::write(path, content).map_err(|e| OutputError::write(path, e))
}

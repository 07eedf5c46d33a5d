use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::PipelineError;
use crate::source::TextSource;
use crate::types::SourceId;

/// Text source that reads a whole delimited file from disk.
pub struct FileTextSource {
    id: SourceId,
    path: PathBuf,
}

impl FileTextSource {
    /// Create a source for `path`; the file name becomes the source id.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .to_string();
        Self { id, path }
    }

    /// Override the source id reported in errors and logs.
    pub fn with_id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = id.into();
        self
    }

    /// Path this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileTextSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self) -> Result<String, PipelineError> {
        let text = fs::read_to_string(&self.path).map_err(|err| PipelineError::Transport {
            source_id: self.id.clone(),
            reason: format!("{}: {err}", self.path.display()),
        })?;
        debug!(
            source_id = %self.id,
            bytes = text.len(),
            modified_at = ?file_mtime(&self.path),
            "read text source file"
        );
        Ok(text)
    }
}

/// Best-effort file modified time.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

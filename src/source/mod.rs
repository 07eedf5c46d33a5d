//! Text source interface and built-in in-memory source.
//!
//! A `TextSource` yields the complete raw text of one dataset. It is the only
//! step of an ingestion run that may block on I/O; parsing, aggregation, and
//! scale building run synchronously on the returned text.

use std::sync::Arc;

use crate::constants::source::IN_MEMORY_SOURCE_ID;
use crate::errors::PipelineError;
use crate::types::SourceId;

/// Store-facing provider of raw delimited text.
///
/// Implementations report availability failures as
/// `PipelineError::Transport`.
pub trait TextSource: Send + Sync {
    /// Stable source identifier used in errors and logs.
    fn id(&self) -> &str;
    /// Fetch the full dataset text.
    fn fetch(&self) -> Result<String, PipelineError>;
}

impl<T: TextSource + ?Sized> TextSource for Arc<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn fetch(&self) -> Result<String, PipelineError> {
        (**self).fetch()
    }
}

/// Text source backed by a string held in memory.
#[derive(Clone, Debug)]
pub struct InMemoryTextSource {
    id: SourceId,
    text: Arc<str>,
}

impl InMemoryTextSource {
    /// Create an in-memory source with the default id.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self::with_id(IN_MEMORY_SOURCE_ID, text)
    }

    /// Create an in-memory source with an explicit id.
    pub fn with_id(id: impl Into<SourceId>, text: impl Into<Arc<str>>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl TextSource for InMemoryTextSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self) -> Result<String, PipelineError> {
        Ok(self.text.to_string())
    }
}

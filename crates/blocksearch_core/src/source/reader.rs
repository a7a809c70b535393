//! Document reader contract and JSON paragraph-dump reader.
//!
//! # Responsibility
//! - Turn one input file into a `SourceDocument`.
//! - Classify per-document input failures for the batch boundary.
//!
//! # Invariants
//! - Readers never panic on malformed input; failures become `ReadError`.
//! - File names must be valid UTF-8 to be stored.

use crate::model::document::SourceDocument;
use crate::model::paragraph::Paragraph;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};

/// Per-document input failures.
#[derive(Debug)]
pub enum ReadError {
    /// File could not be opened, stat'ed or read.
    Io { path: PathBuf, source: std::io::Error },
    /// File has no content.
    Empty(PathBuf),
    /// File name is missing or not valid UTF-8.
    InvalidName(PathBuf),
    /// File content is not a paragraph dump.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read `{}`: {source}", path.display()),
            Self::Empty(path) => write!(f, "document `{}` is empty", path.display()),
            Self::InvalidName(path) => {
                write!(f, "document `{}` has no usable file name", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "document `{}` is not a paragraph dump: {source}", path.display())
            }
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Empty(_) | Self::InvalidName(_) => None,
        }
    }
}

/// Source of paragraph streams.
pub trait DocumentReader {
    /// File extension (without dot) this reader accepts.
    fn extension(&self) -> &str;
    /// Reads one document.
    fn read(&self, path: &Path) -> Result<SourceDocument, ReadError>;
}

/// Reads paragraph dumps: a JSON array of paragraphs as produced by an
/// external word-processing extractor.
///
/// ```json
/// [{"style": "Heading1", "runs": [{"text": "Aff"}]},
///  {"runs": [{"text": "Smith 24", "style": "Style13ptBold"}]}]
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentReader;

impl DocumentReader for JsonDocumentReader {
    fn extension(&self) -> &str {
        "json"
    }

    fn read(&self, path: &Path) -> Result<SourceDocument, ReadError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ReadError::InvalidName(path.to_path_buf()))?
            .to_string();
        let file_path = path
            .to_str()
            .ok_or_else(|| ReadError::InvalidName(path.to_path_buf()))?
            .to_string();

        let io_error = |source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let metadata = std::fs::metadata(path).map_err(io_error)?;
        if metadata.len() == 0 {
            return Err(ReadError::Empty(path.to_path_buf()));
        }
        let last_modified_ms = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, epoch_millis);

        let raw = std::fs::read(path).map_err(io_error)?;
        let paragraphs: Vec<Paragraph> =
            serde_json::from_slice(&raw).map_err(|source| ReadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(SourceDocument {
            file_name,
            file_path,
            last_modified_ms,
            paragraphs,
        })
    }
}

/// Saturates at `i64::MAX` instead of wrapping.
fn epoch_millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

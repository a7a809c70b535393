//! Document ingestion use-case service.
//!
//! # Responsibility
//! - Segment one document and write it inside a single transaction.
//! - Run a batch of documents, skipping the ones that fail.
//!
//! # Invariants
//! - A document is either fully written or not written at all.
//! - At most one `Documents` row per file path: re-ingesting a path replaces
//!   the earlier rows in the same transaction.
//! - One failing document never aborts the batch.
//! - The connection is used from one thread at a time.

use crate::db::DbError;
use crate::model::document::SourceDocument;
use crate::model::outline::OutlineError;
use crate::repo::outline_repo::{
    DocumentRecord, OutlineRepoError, OutlineRepository, SqliteOutlineRepository,
};
use crate::segment::segmenter::segment;
use crate::segment::style::StyleConfig;
use crate::service::outline_persist::{persist_outline, PersistError, PersistReport};
use crate::source::reader::{DocumentReader, ReadError};
use log::{error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Errors from ingesting one document.
#[derive(Debug)]
pub enum IngestError {
    /// Document could not be read.
    Read(ReadError),
    /// Segmentation bookkeeping failed.
    Outline(OutlineError),
    /// Writing failed; the document's rows were rolled back.
    Persist(PersistError),
}

impl Display for IngestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(err) => write!(f, "{err}"),
            Self::Outline(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::Outline(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<ReadError> for IngestError {
    fn from(value: ReadError) -> Self {
        Self::Read(value)
    }
}

impl From<OutlineError> for IngestError {
    fn from(value: OutlineError) -> Self {
        Self::Outline(value)
    }
}

impl From<PersistError> for IngestError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

impl From<OutlineRepoError> for IngestError {
    fn from(value: OutlineRepoError) -> Self {
        Self::Persist(PersistError::Repo(value))
    }
}

impl From<rusqlite::Error> for IngestError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(OutlineRepoError::Db(DbError::Sqlite(value)))
    }
}

/// Result of ingesting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub document_id: i64,
    pub file_path: String,
    pub rows: PersistReport,
    /// Earlier document row for the same path that this ingest replaced.
    pub replaced_document_id: Option<i64>,
    /// Tag paragraphs dropped by card extraction.
    pub rejected_tags: usize,
}

/// Document skipped during a batch.
#[derive(Debug)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub error: IngestError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub ingested: Vec<IngestReport>,
    pub skipped: Vec<SkippedDocument>,
}

impl BatchReport {
    /// Total cards written across the batch.
    pub fn card_count(&self) -> usize {
        self.ingested.iter().map(|report| report.rows.cards).sum()
    }
}

/// Ingestion service over one SQLite connection.
pub struct IngestService<'conn> {
    conn: &'conn Connection,
    styles: StyleConfig,
}

impl<'conn> IngestService<'conn> {
    /// Creates a service writing through `conn` with the given styles.
    pub fn new(conn: &'conn Connection, styles: StyleConfig) -> Self {
        Self { conn, styles }
    }

    /// Segments and writes one document.
    ///
    /// # Side effects
    /// - Inserts the `Documents` row and every outline row in one IMMEDIATE
    ///   transaction; any failure rolls the whole document back.
    /// - Deletes rows previously stored for the same file path first.
    pub fn ingest_document(&self, document: &SourceDocument) -> Result<IngestReport, IngestError> {
        let started_at = Instant::now();
        let mut segmentation = segment(&self.styles, &document.paragraphs)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let repo = SqliteOutlineRepository::try_new(&tx)?;
        let replaced = repo.find_document_by_path(&document.file_path)?;
        if let Some(previous) = replaced {
            repo.delete_document(previous.id)?;
            info!(
                "event=document_ingest module=service status=replace document_id={} previous_last_modified_ms={} last_modified_ms={}",
                previous.id,
                previous.last_modified_ms,
                document.last_modified_ms
            );
        }
        let document_id = repo.insert_document(&DocumentRecord {
            file_name: document.file_name.clone(),
            file_path: document.file_path.clone(),
            last_modified_ms: document.last_modified_ms,
        })?;
        let rows = persist_outline(&repo, &mut segmentation.tree, document_id)?;
        tx.commit()?;

        info!(
            "event=document_ingest module=service status=ok document_id={} paragraphs={} cards={} rejected_tags={} duration_ms={}",
            document_id,
            document.paragraphs.len(),
            rows.cards,
            segmentation.rejected.len(),
            started_at.elapsed().as_millis()
        );

        Ok(IngestReport {
            document_id,
            file_path: document.file_path.clone(),
            rows,
            replaced_document_id: replaced.map(|previous| previous.id),
            rejected_tags: segmentation.rejected.len(),
        })
    }

    /// Reads and ingests one file.
    pub fn ingest_path(
        &self,
        reader: &dyn DocumentReader,
        path: &Path,
    ) -> Result<IngestReport, IngestError> {
        let document = reader.read(path)?;
        self.ingest_document(&document)
    }

    /// Ingests every path in order, skipping documents that fail.
    pub fn ingest_paths(&self, reader: &dyn DocumentReader, paths: &[PathBuf]) -> BatchReport {
        let started_at = Instant::now();
        let mut batch = BatchReport::default();

        for path in paths {
            info!(
                "event=document_ingest module=service status=start path={}",
                path.display()
            );
            match self.ingest_path(reader, path) {
                Ok(report) => batch.ingested.push(report),
                Err(err) => {
                    match &err {
                        IngestError::Read(_) => warn!(
                            "event=document_ingest module=service status=skip error_code=read_failed path={} error={}",
                            path.display(),
                            err
                        ),
                        IngestError::Outline(_) | IngestError::Persist(_) => error!(
                            "event=document_ingest module=service status=error error_code=write_failed path={} error={}",
                            path.display(),
                            err
                        ),
                    }
                    batch.skipped.push(SkippedDocument {
                        path: path.clone(),
                        error: err,
                    });
                }
            }
        }

        info!(
            "event=batch_summary module=service status=ok documents={} ingested={} skipped={} cards={} duration_ms={}",
            paths.len(),
            batch.ingested.len(),
            batch.skipped.len(),
            batch.card_count(),
            started_at.elapsed().as_millis()
        );
        batch
    }
}

//! Outline repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert APIs for documents, headers, cards and card paragraphs.
//! - Provide card filtering by any combination of ancestor header ids.
//! - Keep SQL details inside the repository boundary.
//!
//! # Invariants
//! - Every insert returns the generated row id directly; rows are never
//!   located again by their text value.
//! - All values are bound as statement parameters.
//! - Optional ancestor keys are written as NULL when the ancestor is absent.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{table_exists, table_has_column, DbError};
use crate::model::outline::HeaderLevel;
use crate::model::paragraph::Paragraph;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by outline repository operations.
pub type OutlineRepoResult<T> = Result<T, OutlineRepoError>;

/// Errors from outline repository operations.
#[derive(Debug)]
pub enum OutlineRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Target document does not exist.
    DocumentNotFound(i64),
    /// Stored paragraph content could not be encoded or decoded.
    Content(serde_json::Error),
}

impl Display for OutlineRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "outline repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "outline repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "outline repository requires column `{column}` in table `{table}`"
            ),
            Self::DocumentNotFound(id) => write!(f, "document not found: {id}"),
            Self::Content(err) => write!(f, "invalid stored paragraph content: {err}"),
        }
    }
}

impl Error for OutlineRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Content(err) => Some(err),
            Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. }
            | Self::DocumentNotFound(_) => None,
        }
    }
}

impl From<DbError> for OutlineRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for OutlineRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row written to `Documents`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub file_name: String,
    pub file_path: String,
    /// Unix epoch milliseconds.
    pub last_modified_ms: i64,
}

/// Existing `Documents` row located by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: i64,
    pub last_modified_ms: i64,
}

/// Denormalized ancestor foreign keys carried by header and card rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AncestorKeys {
    pub pocket_id: Option<i64>,
    pub hat_id: Option<i64>,
    pub block_id: Option<i64>,
}

impl AncestorKeys {
    /// Records `id` for `level`. The nearest ancestor of a level wins.
    pub fn record(&mut self, level: HeaderLevel, id: i64) {
        let slot = match level {
            HeaderLevel::Pocket => &mut self.pocket_id,
            HeaderLevel::Hat => &mut self.hat_id,
            HeaderLevel::Block => &mut self.block_id,
        };
        slot.get_or_insert(id);
    }
}

/// Filter for listing persisted cards. Unset fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardQuery {
    pub document_id: Option<i64>,
    pub pocket_id: Option<i64>,
    pub hat_id: Option<i64>,
    pub block_id: Option<i64>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Persisted card read model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub id: i64,
    pub document_id: i64,
    pub ancestors: AncestorKeys,
    pub tag: String,
    pub author: String,
}

/// Repository interface for outline storage.
pub trait OutlineRepository {
    /// Inserts one document row and returns its id.
    fn insert_document(&self, document: &DocumentRecord) -> OutlineRepoResult<i64>;
    /// Finds the most recent document stored for `file_path`.
    fn find_document_by_path(&self, file_path: &str) -> OutlineRepoResult<Option<StoredDocument>>;
    /// Inserts one header row into its level's table and returns its id.
    ///
    /// Ancestor keys that the level's table does not carry are ignored.
    fn insert_header(
        &self,
        level: HeaderLevel,
        document_id: i64,
        text: &str,
        ancestors: &AncestorKeys,
    ) -> OutlineRepoResult<i64>;
    /// Inserts one card row and returns its id.
    fn insert_card(
        &self,
        document_id: i64,
        tagline: &str,
        citation: &str,
        ancestors: &AncestorKeys,
    ) -> OutlineRepoResult<i64>;
    /// Inserts one body paragraph row for a card and returns its id.
    ///
    /// Stores the plain text for search plus the styled runs.
    fn insert_paragraph(
        &self,
        document_id: i64,
        card_id: i64,
        paragraph: &Paragraph,
    ) -> OutlineRepoResult<i64>;
    /// Lists cards matching every set filter, in insertion order.
    fn list_cards(&self, query: &CardQuery) -> OutlineRepoResult<Vec<CardRecord>>;
    /// Lists a card's body paragraphs, with run styles, in document order.
    fn list_card_paragraphs(&self, card_id: i64) -> OutlineRepoResult<Vec<Paragraph>>;
    /// Deletes a document and every row that belongs to it.
    fn delete_document(&self, document_id: i64) -> OutlineRepoResult<()>;
}

/// SQLite-backed outline repository.
pub struct SqliteOutlineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOutlineRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> OutlineRepoResult<Self> {
        ensure_outline_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl OutlineRepository for SqliteOutlineRepository<'_> {
    fn insert_document(&self, document: &DocumentRecord) -> OutlineRepoResult<i64> {
        self.conn.execute(
            "INSERT INTO Documents (FileName, FilePath, LastModified)
             VALUES (?1, ?2, ?3);",
            params![
                document.file_name.as_str(),
                document.file_path.as_str(),
                document.last_modified_ms,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_document_by_path(&self, file_path: &str) -> OutlineRepoResult<Option<StoredDocument>> {
        let mut stmt = self.conn.prepare(
            "SELECT ID, LastModified
             FROM Documents
             WHERE FilePath = ?1
             ORDER BY ID DESC
             LIMIT 1;",
        )?;
        let mut rows = stmt.query([file_path])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(StoredDocument {
            id: row.get(0)?,
            last_modified_ms: row.get(1)?,
        }))
    }

    fn insert_header(
        &self,
        level: HeaderLevel,
        document_id: i64,
        text: &str,
        ancestors: &AncestorKeys,
    ) -> OutlineRepoResult<i64> {
        match level {
            HeaderLevel::Pocket => self.conn.execute(
                "INSERT INTO Pockets (DocumentID, PocketText) VALUES (?1, ?2);",
                params![document_id, text],
            )?,
            HeaderLevel::Hat => self.conn.execute(
                "INSERT INTO Hats (DocumentID, PocketID, HatText) VALUES (?1, ?2, ?3);",
                params![document_id, ancestors.pocket_id, text],
            )?,
            HeaderLevel::Block => self.conn.execute(
                "INSERT INTO Blocks (DocumentID, PocketID, HatID, BlockText)
                 VALUES (?1, ?2, ?3, ?4);",
                params![document_id, ancestors.pocket_id, ancestors.hat_id, text],
            )?,
        };
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_card(
        &self,
        document_id: i64,
        tagline: &str,
        citation: &str,
        ancestors: &AncestorKeys,
    ) -> OutlineRepoResult<i64> {
        self.conn.execute(
            "INSERT INTO Cards (DocumentID, PocketID, HatID, BlockID, Tag, Author)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                document_id,
                ancestors.pocket_id,
                ancestors.hat_id,
                ancestors.block_id,
                tagline,
                citation,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_paragraph(
        &self,
        document_id: i64,
        card_id: i64,
        paragraph: &Paragraph,
    ) -> OutlineRepoResult<i64> {
        let content = serde_json::to_string(paragraph).map_err(OutlineRepoError::Content)?;
        self.conn.execute(
            "INSERT INTO Paragraphs (DocumentID, CardID, Paragraph, Content)
             VALUES (?1, ?2, ?3, ?4);",
            params![document_id, card_id, paragraph.text(), content],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_cards(&self, query: &CardQuery) -> OutlineRepoResult<Vec<CardRecord>> {
        let mut sql = String::from(
            "SELECT ID, DocumentID, PocketID, HatID, BlockID, Tag, Author
             FROM Cards
             WHERE 1 = 1",
        );
        let mut bind_values: Vec<Value> = Vec::new();

        for (column, value) in [
            ("DocumentID", query.document_id),
            ("PocketID", query.pocket_id),
            ("HatID", query.hat_id),
            ("BlockID", query.block_id),
        ] {
            if let Some(value) = value {
                sql.push_str(&format!(" AND {column} = ?"));
                bind_values.push(Value::Integer(value));
            }
        }

        sql.push_str(" ORDER BY ID ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn list_card_paragraphs(&self, card_id: i64) -> OutlineRepoResult<Vec<Paragraph>> {
        let mut stmt = self.conn.prepare(
            "SELECT Content
             FROM Paragraphs
             WHERE CardID = ?1
             ORDER BY ID ASC;",
        )?;
        let mut rows = stmt.query([card_id])?;
        let mut paragraphs = Vec::new();
        while let Some(row) = rows.next()? {
            let content: String = row.get(0)?;
            paragraphs
                .push(serde_json::from_str(&content).map_err(OutlineRepoError::Content)?);
        }
        Ok(paragraphs)
    }

    fn delete_document(&self, document_id: i64) -> OutlineRepoResult<()> {
        // Child tables first so the delete also works without FK cascades.
        for sql in [
            "DELETE FROM Paragraphs WHERE DocumentID = ?1;",
            "DELETE FROM Cards WHERE DocumentID = ?1;",
            "DELETE FROM Blocks WHERE DocumentID = ?1;",
            "DELETE FROM Hats WHERE DocumentID = ?1;",
            "DELETE FROM Pockets WHERE DocumentID = ?1;",
        ] {
            self.conn.execute(sql, [document_id])?;
        }
        let changed = self
            .conn
            .execute("DELETE FROM Documents WHERE ID = ?1;", [document_id])?;
        if changed == 0 {
            return Err(OutlineRepoError::DocumentNotFound(document_id));
        }
        Ok(())
    }
}

fn parse_card_row(row: &Row<'_>) -> OutlineRepoResult<CardRecord> {
    Ok(CardRecord {
        id: row.get("ID")?,
        document_id: row.get("DocumentID")?,
        ancestors: AncestorKeys {
            pocket_id: row.get("PocketID")?,
            hat_id: row.get("HatID")?,
            block_id: row.get("BlockID")?,
        },
        tag: row.get("Tag")?,
        author: row.get("Author")?,
    })
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("Documents", &["ID", "FileName", "FilePath", "LastModified"]),
    ("Pockets", &["ID", "DocumentID", "PocketText"]),
    ("Hats", &["ID", "DocumentID", "PocketID", "HatText"]),
    ("Blocks", &["ID", "DocumentID", "PocketID", "HatID", "BlockText"]),
    (
        "Cards",
        &["ID", "DocumentID", "PocketID", "HatID", "BlockID", "Tag", "Author"],
    ),
    ("Paragraphs", &["ID", "DocumentID", "CardID", "Paragraph", "Content"]),
];

fn ensure_outline_connection_ready(conn: &Connection) -> OutlineRepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(OutlineRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(OutlineRepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(OutlineRepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

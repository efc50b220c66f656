//! SQLite-backed DocumentStore

use crate::{now_millis, StoreError};
use docsift_domain::traits::DocumentStore;
use docsift_domain::{
    AnalysisResult, BlobKey, Document, DocumentId, DocumentMetadata, DocumentType, NewDocument,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const SELECT_DOCUMENT: &str = "SELECT id, filename, blob_key, text, summary, metadata, type, created_at, updated_at
     FROM documents";

/// SQLite-based implementation of DocumentStore
///
/// # Thread Safety
///
/// A SQLite connection is `Send` but not `Sync`. Share one store behind a
/// mutex, or open one store per thread against the same file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use docsift_store::SqliteStore;
    ///
    /// let store = SqliteStore::open("docsift.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Opened document store");
        Self::initialize(conn)
    }

    /// Open a private in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        // In-memory databases report "memory" and ignore the request
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "Configured journal mode");

        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    fn fetch(conn: &Connection, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let row = conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_DOCUMENT),
                params![id.as_str()],
                DocumentRow::from_row,
            )
            .optional()?;

        row.map(DocumentRow::into_document).transpose()
    }
}

fn is_primary_key_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

impl DocumentStore for SqliteStore {
    type Error = StoreError;

    fn create(&mut self, document: NewDocument) -> Result<Document, Self::Error> {
        let now = now_millis();
        let inserted = self.conn.execute(
            "INSERT INTO documents (id, filename, blob_key, text, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                document.id.as_str(),
                &document.filename,
                document.blob_key.as_str(),
                &document.text,
                now as i64,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_primary_key_violation(&e) => {
                return Err(StoreError::Duplicate(document.id));
            }
            Err(e) => return Err(e.into()),
        }

        info!(id = %document.id, filename = %document.filename, "Created document");
        Ok(Document::from_new(document, now))
    }

    fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>, Self::Error> {
        Self::fetch(&self.conn, id)
    }

    fn update_analysis(
        &mut self,
        id: &DocumentId,
        analysis: &AnalysisResult,
    ) -> Result<Document, Self::Error> {
        let metadata = serde_json::to_string(&analysis.metadata)?;
        let tx = self.conn.transaction()?;

        let changed = tx.execute(
            "UPDATE documents
             SET summary = ?2, metadata = ?3, type = ?4, updated_at = MAX(?5, updated_at + 1)
             WHERE id = ?1",
            params![
                id.as_str(),
                &analysis.summary,
                &metadata,
                analysis.document_type.as_str(),
                now_millis() as i64,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }

        let document = Self::fetch(&tx, id)?.ok_or_else(|| StoreError::NotFound(id.clone()))?;
        tx.commit()?;

        info!(id = %id, document_type = %analysis.document_type, "Stored analysis");
        Ok(document)
    }

    fn list_all(&self) -> Result<Vec<Document>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY created_at DESC, id DESC", SELECT_DOCUMENT))?;

        let rows = stmt
            .query_map([], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }
}

/// Raw column values of one `documents` row
struct DocumentRow {
    id: String,
    filename: String,
    blob_key: String,
    text: String,
    summary: Option<String>,
    metadata: Option<String>,
    document_type: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            filename: row.get(1)?,
            blob_key: row.get(2)?,
            text: row.get(3)?,
            summary: row.get(4)?,
            metadata: row.get(5)?,
            document_type: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_document(self) -> Result<Document, StoreError> {
        let id = DocumentId::from(self.id);

        let analysis = match (self.summary, self.metadata, self.document_type) {
            (None, None, None) => None,
            (Some(summary), Some(metadata), Some(document_type)) => {
                let metadata: DocumentMetadata = serde_json::from_str(&metadata).map_err(|e| {
                    StoreError::InvalidData(format!("Unreadable metadata for {}: {}", id, e))
                })?;
                let document_type: DocumentType = document_type.parse().map_err(|_| {
                    StoreError::InvalidData(format!("Empty document type for {}", id))
                })?;
                Some(AnalysisResult {
                    summary,
                    document_type,
                    metadata,
                })
            }
            _ => {
                return Err(StoreError::InvalidData(format!(
                    "Partially populated analysis for {}",
                    id
                )))
            }
        };

        Ok(Document {
            id,
            filename: self.filename,
            blob_key: BlobKey::from_stored(self.blob_key),
            text: self.text,
            analysis,
            created_at: self.created_at as u64,
            updated_at: self.updated_at as u64,
        })
    }
}

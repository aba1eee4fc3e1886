//! SQLite-backed metadata store.
//!
//! All metadata lives in a single `metadata` table:
//!
//! ```text
//! id | source_path | field_name | field_type ('I', 'S' or NULL) | total_occurrences | null_occurrences
//! ```
//!
//! Occurrence counts and the type marker are guarded by `CHECK` constraints, so invalid
//! metadata is rejected by the database itself. `(source_path, field_name)` is not unique;
//! refusing to crawl a path twice is the caller's job (see [`MetadataStore::has_metadata`]).
//!
//! Every engine failure is logged and reported as a [`StorageError`].

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{StorageError, StorageResult};
use crate::types::{FieldType, Metadata};

const SCHEMA: &str = "
    CREATE TABLE metadata (
        id INTEGER PRIMARY KEY,
        source_path TEXT NOT NULL,
        field_name TEXT NOT NULL,
        field_type TEXT CHECK ( field_type IN ('I', 'S') ),
        total_occurrences INTEGER NOT NULL CHECK ( total_occurrences > 0 ),
        null_occurrences INTEGER NOT NULL CHECK ( null_occurrences >= 0 ),
        CHECK ( total_occurrences >= null_occurrences )
    );

    CREATE INDEX metadata_source_path ON metadata (source_path);
";

/// Persistent metadata store keyed by source path.
pub struct MetadataStore {
    conn: Connection,
    location: Option<PathBuf>,
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("location", &self.location)
            .finish()
    }
}

impl MetadataStore {
    /// Default database file name, relative to the working directory.
    pub const DEFAULT_FILE_NAME: &'static str = "metadata_gather.db";

    /// Open the store at `location`.
    ///
    /// A missing or empty file is initialized with a fresh schema. An existing database is
    /// opened as-is.
    pub fn open(location: impl AsRef<Path>) -> StorageResult<Self> {
        let location = location.as_ref();
        let needs_schema = std::fs::metadata(location)
            .map(|m| !m.is_file() || m.len() == 0)
            .unwrap_or(true);

        let conn = Connection::open(location).map_err(|err| {
            if needs_schema {
                engine_failure(StorageError::CreateSchema, err)
            } else {
                engine_failure(StorageError::Connect, err)
            }
        })?;

        let store = Self {
            conn,
            location: Some(location.to_path_buf()),
        };
        if needs_schema {
            store.create_schema()?;
            tracing::debug!(location = %location.display(), "initialized metadata store");
        } else {
            store.check_connection()?;
        }
        Ok(store)
    }

    /// Open a fresh store that lives only as long as the returned value.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|err| engine_failure(StorageError::CreateSchema, err))?;
        let store = Self {
            conn,
            location: None,
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Database file backing this store (`None` when in memory).
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn create_schema(&self) -> StorageResult<()> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(|err| engine_failure(StorageError::CreateSchema, err))
    }

    fn check_connection(&self) -> StorageResult<()> {
        self.conn
            .query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|err| engine_failure(StorageError::Connect, err))
    }

    /// Store `metadata` under `path`.
    ///
    /// Rows are written in one transaction: if any row is rejected, nothing is stored.
    pub fn store<'a, I>(&mut self, path: &str, metadata: I) -> StorageResult<usize>
    where
        I: IntoIterator<Item = &'a Metadata>,
    {
        let write = |err: rusqlite::Error| engine_failure(StorageError::Write, err);

        let tx = self.conn.transaction().map_err(write)?;
        let mut rows = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO metadata
                        (source_path, field_name, field_type, total_occurrences, null_occurrences)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(write)?;

            for m in metadata {
                let total = to_sql_count(m.total_occurrences)?;
                let nulls = to_sql_count(m.null_occurrences)?;
                stmt.execute(params![path, m.field, m.field_type.code(), total, nulls])
                    .map_err(write)?;
                rows += 1;
            }
        }
        tx.commit().map_err(write)?;

        tracing::debug!(path, rows, "stored metadata");
        Ok(rows)
    }

    /// All metadata stored under `path`, in no particular order.
    ///
    /// Returns an empty list when nothing is stored for `path`. Rows are read eagerly: the
    /// underlying row cursor borrows a statement local to this call, so the result is collected
    /// before returning instead of being handed out as a lazy iterator. There is one row per
    /// field, so the list stays small. Callers that want a stream can use `into_iter()`.
    pub fn retrieve(&self, path: &str) -> StorageResult<Vec<Metadata>> {
        let read = |err: rusqlite::Error| engine_failure(StorageError::Read, err);

        let mut stmt = self
            .conn
            .prepare(
                "SELECT field_name, field_type, total_occurrences, null_occurrences
                 FROM metadata WHERE source_path = ?1",
            )
            .map_err(read)?;

        let rows = stmt
            .query_map(params![path], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(read)?;

        let mut metadata = Vec::new();
        for row in rows {
            let (field, code, total, nulls) = row.map_err(read)?;
            let field_type = FieldType::from_code(code.as_deref()).ok_or_else(|| {
                tracing::debug!(path, field = %field, ?code, "unknown field type marker");
                StorageError::Read
            })?;
            metadata.push(Metadata::new(
                field,
                field_type,
                from_sql_count(total)?,
                from_sql_count(nulls)?,
            ));
        }
        Ok(metadata)
    }

    /// Whether any metadata is stored under `path`.
    pub fn has_metadata(&self, path: &str) -> StorageResult<bool> {
        self.conn
            .query_row(
                "SELECT 1 FROM metadata WHERE source_path = ?1 LIMIT 1",
                params![path],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(|err| engine_failure(StorageError::Read, err))
    }
}

fn engine_failure(kind: StorageError, err: rusqlite::Error) -> StorageError {
    tracing::debug!(error = %err, "metadata store failure: {kind}");
    kind
}

fn to_sql_count(count: u64) -> StorageResult<i64> {
    i64::try_from(count).map_err(|_| {
        tracing::debug!(count, "occurrence count out of range");
        StorageError::Write
    })
}

fn from_sql_count(count: i64) -> StorageResult<u64> {
    u64::try_from(count).map_err(|_| {
        tracing::debug!(count, "negative occurrence count in store");
        StorageError::Read
    })
}

#[cfg(test)]
mod tests {
    use super::MetadataStore;
    use crate::error::StorageError;
    use crate::types::{FieldType, Metadata};

    #[test]
    fn in_memory_store_round_trips() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let m = Metadata::new("field", FieldType::Integer, 10, 0);
        assert_eq!(store.store("abc", [&m]).unwrap(), 1);
        assert_eq!(store.retrieve("abc").unwrap(), vec![m]);
        assert!(store.has_metadata("abc").unwrap());
        assert!(!store.has_metadata("def").unwrap());
    }

    #[test]
    fn zero_total_is_rejected() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let m = Metadata::new("field", FieldType::Null, 0, 0);
        assert_eq!(store.store("abc", [&m]).unwrap_err(), StorageError::Write);
        assert!(store.retrieve("abc").unwrap().is_empty());
    }

    #[test]
    fn counts_beyond_i64_are_rejected_before_reaching_the_engine() {
        let mut store = MetadataStore::open_in_memory().unwrap();
        let m = Metadata::new("field", FieldType::Integer, u64::MAX, 0);
        assert_eq!(store.store("abc", [&m]).unwrap_err(), StorageError::Write);
        assert!(!store.has_metadata("abc").unwrap());
    }

    #[test]
    fn unknown_type_marker_is_a_read_error() {
        let store = MetadataStore::open_in_memory().unwrap();
        // Bypass the CHECK constraint to simulate a corrupted row.
        store
            .conn
            .execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 INSERT INTO metadata
                    (source_path, field_name, field_type, total_occurrences, null_occurrences)
                 VALUES ('abc', 'f', 'X', 1, 0);",
            )
            .unwrap();
        assert_eq!(store.retrieve("abc").unwrap_err(), StorageError::Read);
    }
}

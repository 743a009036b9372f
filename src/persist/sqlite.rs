//! SQLite-backed relational and document stores.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, params};

use crate::{
    record::{DecodeError, OperationDocument, OperationRecord, decode_arguments, encode_arguments},
    types::{Flavor, RecordId},
};

use super::{DocumentStore, RelationalStore, StoreResult};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn init_connection(conn: &Connection, schema: &str) -> StoreResult<()> {
    conn.execute_batch(schema)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

/// SQLite implementation of [`RelationalStore`].
///
/// Several instances may open the same file; each `max_id` read sees rows
/// committed by the others.
pub struct SqliteRelationalStore {
    conn: Mutex<Connection>,
}

impl SqliteRelationalStore {
    /// Opens or creates the `operations` table at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        init_connection(&conn, include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_connection(&conn, include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl RelationalStore for SqliteRelationalStore {
    fn max_id(&self) -> StoreResult<Option<RecordId>> {
        let conn = self.conn.lock();
        let max: Option<i64> =
            conn.query_row("SELECT MAX(rawid) FROM operations", [], |row| row.get(0))?;
        Ok(max)
    }

    fn insert(&self, record: &OperationRecord) -> StoreResult<()> {
        let arguments = encode_arguments(&record.arguments)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO operations(rawid, flavor, operation, result, arguments) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.flavor.as_str(),
                record.operation,
                record.result,
                arguments,
            ],
        )?;
        Ok(())
    }

    fn select_all(&self) -> StoreResult<Vec<OperationRecord>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT rawid, flavor, operation, result, arguments FROM operations")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, flavor, operation, result, arguments) = row?;
            let flavor = Flavor::parse(&flavor).ok_or(DecodeError::Flavor(flavor))?;
            out.push(OperationRecord {
                id,
                flavor,
                operation,
                result,
                arguments: decode_arguments(&arguments).map_err(DecodeError::from)?,
            });
        }
        Ok(out)
    }
}

/// SQLite implementation of [`DocumentStore`].
///
/// Documents are JSON bodies keyed by a native `_id` that reads never select.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Opens or creates the `calculator` collection table at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        init_connection(&conn, include_str!("documents.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_connection(&conn, include_str!("documents.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn insert_document(&self, doc: &OperationDocument) -> StoreResult<()> {
        let body = serde_json::to_string(doc)?;
        self.conn
            .lock()
            .execute("INSERT INTO calculator(body) VALUES (?1)", params![body])?;
        Ok(())
    }

    fn find_documents(&self) -> StoreResult<Vec<OperationDocument>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT body FROM calculator")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut out = Vec::new();
        for body in rows {
            out.push(serde_json::from_str(&body?)?);
        }
        Ok(out)
    }
}

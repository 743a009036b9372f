pub mod sqlite;

#[cfg(feature = "mongo")]
pub mod mongo;
#[cfg(feature = "postgres")]
pub mod postgres;

use crate::{
    record::{DecodeError, OperationDocument, OperationRecord},
    types::RecordId,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[cfg(feature = "postgres")]
    #[error("postgres: {0}")]
    Postgres(#[from] ::postgres::Error),
    #[cfg(feature = "mongo")]
    #[error("mongo: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("id space exhausted after {0}")]
    IdSpaceExhausted(RecordId),
    #[error("{0}")]
    Message(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row-shaped authoritative store. Owns the id sequence.
pub trait RelationalStore: Send + Sync {
    /// Largest stored id, or `None` when the table is empty.
    fn max_id(&self) -> StoreResult<Option<RecordId>>;
    fn insert(&self, record: &OperationRecord) -> StoreResult<()>;
    /// Every row in storage order.
    fn select_all(&self) -> StoreResult<Vec<OperationRecord>>;
}

/// Schema-flexible mirror store.
pub trait DocumentStore: Send + Sync {
    fn insert_document(&self, doc: &OperationDocument) -> StoreResult<()>;
    /// Every document in storage order, native identity field excluded.
    fn find_documents(&self) -> StoreResult<Vec<OperationDocument>>;
}

impl<T: RelationalStore + ?Sized> RelationalStore for std::sync::Arc<T> {
    fn max_id(&self) -> StoreResult<Option<RecordId>> {
        (**self).max_id()
    }

    fn insert(&self, record: &OperationRecord) -> StoreResult<()> {
        (**self).insert(record)
    }

    fn select_all(&self) -> StoreResult<Vec<OperationRecord>> {
        (**self).select_all()
    }
}

impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    fn insert_document(&self, doc: &OperationDocument) -> StoreResult<()> {
        (**self).insert_document(doc)
    }

    fn find_documents(&self) -> StoreResult<Vec<OperationDocument>> {
        (**self).find_documents()
    }
}

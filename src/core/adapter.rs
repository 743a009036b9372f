//! Failure-swallowing adapters over the store backends.
//!
//! Every backend error stops here: it is logged and replaced by a safe
//! default so callers never observe a persistence failure.

use tracing::warn;

use crate::{
    persist::{DocumentStore, RelationalStore, StoreError, StoreResult},
    record::OperationRecord,
    types::RecordId,
};

/// Id handed out when the relational store cannot be read.
pub const FALLBACK_ID: RecordId = 1;

/// Outcome of one adapter call.
///
/// `Degraded` carries the default that replaced a failed store call. Callers
/// treat both variants the same; the split exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Ok(T),
    Degraded(T),
}

impl<T> Outcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Ok(v) | Self::Degraded(v) => v,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    fn from_result(
        result: StoreResult<T>,
        default: impl FnOnce() -> T,
        what: &'static str,
        store: &'static str,
    ) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(err) => {
                warn!(store, error = %err, "{what} failed");
                Self::Degraded(default())
            }
        }
    }
}

/// Authoritative adapter: id sequencing and row storage.
pub struct RelationalAdapter {
    store: Box<dyn RelationalStore>,
}

impl RelationalAdapter {
    pub fn new(store: impl RelationalStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// `1 + max(id)`, or `1` on an empty or unreachable store.
    ///
    /// `Degraded(None)` when `max(id)` is already `RecordId::MAX`.
    pub fn next_id(&self) -> Outcome<Option<RecordId>> {
        let next = self.store.max_id().and_then(|max| match max {
            None => Ok(FALLBACK_ID),
            Some(id) => id.checked_add(1).ok_or(StoreError::IdSpaceExhausted(id)),
        });
        match next {
            Err(StoreError::IdSpaceExhausted(max)) => {
                warn!(store = "relational", max, "id space exhausted");
                Outcome::Degraded(None)
            }
            other => Outcome::from_result(
                other.map(Some),
                || Some(FALLBACK_ID),
                "id generation",
                "relational",
            ),
        }
    }

    pub fn insert(&self, record: &OperationRecord) -> Outcome<()> {
        Outcome::from_result(self.store.insert(record), || (), "insert", "relational")
    }

    /// All rows in storage order; empty on failure.
    pub fn list_all(&self) -> Outcome<Vec<OperationRecord>> {
        Outcome::from_result(self.store.select_all(), Vec::new, "list", "relational")
    }
}

/// Mirror adapter: best-effort document copies.
pub struct DocumentAdapter {
    store: Box<dyn DocumentStore>,
}

impl DocumentAdapter {
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn insert(&self, record: &OperationRecord) -> Outcome<()> {
        let result = record
            .to_document()
            .map_err(Into::into)
            .and_then(|doc| self.store.insert_document(&doc));
        Outcome::from_result(result, || (), "insert", "document")
    }

    /// All documents mapped back to records; empty on failure.
    pub fn list_all(&self) -> Outcome<Vec<OperationRecord>> {
        let result = self.store.find_documents().and_then(|docs| {
            docs.into_iter()
                .map(|doc| OperationRecord::try_from(doc).map_err(Into::into))
                .collect::<StoreResult<Vec<_>>>()
        });
        Outcome::from_result(result, Vec::new, "list", "document")
    }
}

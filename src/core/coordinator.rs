use std::path::Path;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{
    persist::{
        StoreResult,
        sqlite::{SqliteDocumentStore, SqliteRelationalStore},
    },
    record::OperationRecord,
    types::{Flavor, Operand, StoreSelector},
};

use super::adapter::{DocumentAdapter, RelationalAdapter};

/// Sequences dual writes and routes history reads.
///
/// The relational store is the id authority; the document store is a
/// best-effort mirror. `save` and `fetch` never fail.
pub struct PersistenceCoordinator {
    relational: RelationalAdapter,
    document: DocumentAdapter,
    // Held across next_id and the relational insert.
    sequence: Mutex<()>,
}

impl PersistenceCoordinator {
    pub fn new(relational: RelationalAdapter, document: DocumentAdapter) -> Self {
        Self {
            relational,
            document,
            sequence: Mutex::new(()),
        }
    }

    /// Opens file-backed SQLite stores under `dir` (`operations.db`, `calculator.db`).
    pub fn open_sqlite(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        Ok(Self::new(
            RelationalAdapter::new(SqliteRelationalStore::open(dir.join("operations.db"))?),
            DocumentAdapter::new(SqliteDocumentStore::open(dir.join("calculator.db"))?),
        ))
    }

    /// Wires the PostgreSQL and MongoDB backends.
    ///
    /// Neither store is contacted here; an unreachable host surfaces later as
    /// degraded adapter calls.
    #[cfg(all(feature = "postgres", feature = "mongo"))]
    pub fn connect(config: &crate::config::StoreConfig) -> StoreResult<Self> {
        use crate::persist::{mongo::MongoDocumentStore, postgres::PostgresRelationalStore};

        Ok(Self::new(
            RelationalAdapter::new(PostgresRelationalStore::new(config)),
            DocumentAdapter::new(MongoDocumentStore::connect(config)?),
        ))
    }

    /// Records one successful evaluation in both stores.
    ///
    /// The mirror insert is attempted even when the relational insert failed.
    /// Nothing is written once the id sequence is exhausted.
    pub fn save(&self, flavor: Flavor, operation: &str, result: Operand, arguments: &[Operand]) {
        let record = {
            let _guard = self.sequence.lock();
            let Some(id) = self.relational.next_id().into_inner() else {
                warn!(operation, "no id available, save skipped");
                return;
            };
            let record = OperationRecord {
                id,
                flavor,
                operation: operation.to_string(),
                result,
                arguments: arguments.to_vec(),
            };
            let relational = self.relational.insert(&record);
            debug!(id, %flavor, operation, degraded = relational.is_degraded(), "relational insert");
            record
        };

        let document = self.document.insert(&record);
        debug!(id = record.id, degraded = document.is_degraded(), "document insert");
    }

    /// Lists every record from the store named by `selector`.
    ///
    /// Unrecognized selectors, including the empty string, yield an empty list.
    pub fn fetch(&self, selector: &str) -> Vec<OperationRecord> {
        match StoreSelector::parse(selector) {
            Some(store) => self.fetch_from(store),
            None => {
                debug!(selector, "unknown store selector");
                Vec::new()
            }
        }
    }

    pub fn fetch_from(&self, store: StoreSelector) -> Vec<OperationRecord> {
        let listed = match store {
            StoreSelector::Relational => self.relational.list_all(),
            StoreSelector::Document => self.document.list_all(),
        };
        debug!(store = store.as_str(), degraded = listed.is_degraded(), "history fetch");
        listed.into_inner()
    }
}

/// Keeps records whose flavor token equals `flavor` exactly.
///
/// `None` or an empty filter keeps everything.
pub fn filter_by_flavor(records: Vec<OperationRecord>, flavor: Option<&str>) -> Vec<OperationRecord> {
    match flavor.filter(|f| !f.is_empty()) {
        Some(flavor) => records
            .into_iter()
            .filter(|r| r.flavor.as_str() == flavor)
            .collect(),
        None => records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> PersistenceCoordinator {
        PersistenceCoordinator::new(
            RelationalAdapter::new(SqliteRelationalStore::open_in_memory().expect("relational")),
            DocumentAdapter::new(SqliteDocumentStore::open_in_memory().expect("document")),
        )
    }

    #[test]
    fn plus_then_minus_scenario() {
        let coord = coordinator();
        coord.save(Flavor::Independent, "plus", 12, &[5, 7]);
        coord.save(Flavor::Stack, "minus", 2, &[5, 3]);

        let all = coord.fetch("POSTGRES");
        assert_eq!(all.len(), 2);
        assert_eq!((all[0].id, all[0].operation.as_str()), (1, "plus"));
        assert_eq!((all[1].id, all[1].operation.as_str()), (2, "minus"));
        assert_eq!(all[1].arguments, vec![5, 3]);

        let stack_only = filter_by_flavor(all.clone(), Some("STACK"));
        assert_eq!(stack_only, vec![all[1].clone()]);
        assert_eq!(filter_by_flavor(all.clone(), Some("")), all);
        assert_eq!(filter_by_flavor(all.clone(), None), all);
    }

    #[test]
    fn unknown_selector_is_empty() {
        let coord = coordinator();
        coord.save(Flavor::Independent, "abs", 3, &[-3]);
        assert!(coord.fetch("UNKNOWN").is_empty());
        assert!(coord.fetch("").is_empty());
        assert_eq!(coord.fetch("MONGO").len(), 1);
    }
}

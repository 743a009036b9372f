//! MongoDB document backend (blocking driver API).

use mongodb::{
    bson::doc,
    options::FindOptions,
    sync::{Client, Collection},
};

use crate::{
    config::{StoreConfig, document},
    record::OperationDocument,
};

use super::{DocumentStore, StoreResult};

/// Document store over the `calculator` collection.
pub struct MongoDocumentStore {
    collection: Collection<OperationDocument>,
}

impl MongoDocumentStore {
    /// Builds the client. The driver connects on first use and reconnects on its own.
    pub fn connect(store: &StoreConfig) -> StoreResult<Self> {
        let client = Client::with_uri_str(store.document_uri())?;
        let collection = client
            .database(document::DATABASE)
            .collection::<OperationDocument>(document::COLLECTION);
        Ok(Self { collection })
    }
}

impl DocumentStore for MongoDocumentStore {
    fn insert_document(&self, doc: &OperationDocument) -> StoreResult<()> {
        self.collection.insert_one(doc, None)?;
        Ok(())
    }

    fn find_documents(&self) -> StoreResult<Vec<OperationDocument>> {
        let options = FindOptions::builder().projection(doc! { "_id": 0 }).build();
        let cursor = self.collection.find(None, options)?;

        let mut out = Vec::new();
        for doc in cursor {
            out.push(doc?);
        }
        Ok(out)
    }
}

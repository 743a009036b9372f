//! PostgreSQL relational backend.

use parking_lot::Mutex;
use postgres::{Client, Config, NoTls};

use crate::{
    config::{StoreConfig, relational},
    record::{DecodeError, OperationRecord, decode_arguments, encode_arguments},
    types::{Flavor, RecordId},
};

use super::{RelationalStore, StoreError, StoreResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS operations (
    rawid BIGINT PRIMARY KEY,
    flavor TEXT NOT NULL,
    operation TEXT NOT NULL,
    result BIGINT NOT NULL,
    arguments TEXT NOT NULL
)";

// Ids and results are cast through int8 so tables created with int4 columns
// still map onto i64.
const MAX_ID: &str = "SELECT MAX(rawid)::BIGINT FROM operations";
const INSERT: &str = "INSERT INTO operations (rawid, flavor, operation, result, arguments) \
                      VALUES ($1::BIGINT, $2, $3, $4::BIGINT, $5)";
const SELECT_ALL: &str =
    "SELECT rawid::BIGINT, flavor, operation, result::BIGINT, arguments FROM operations";

/// Relational store over a lazily (re)established PostgreSQL connection.
///
/// A failed call drops the connection; the next call reconnects.
pub struct PostgresRelationalStore {
    config: Config,
    client: Mutex<Option<Client>>,
}

impl PostgresRelationalStore {
    pub fn new(store: &StoreConfig) -> Self {
        let mut config = Config::new();
        config
            .host(&store.relational_host)
            .port(relational::PORT)
            .user(relational::USER)
            .password(relational::PASSWORD)
            .dbname(relational::DATABASE)
            .connect_timeout(relational::CONNECT_TIMEOUT);
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    fn with_client<T>(
        &self,
        f: impl FnOnce(&mut Client) -> Result<T, postgres::Error>,
    ) -> StoreResult<T> {
        let mut slot = self.client.lock();
        if slot.is_none() {
            let mut client = self.config.connect(NoTls)?;
            client.batch_execute(SCHEMA)?;
            *slot = Some(client);
        }
        let Some(client) = slot.as_mut() else {
            return Err(StoreError::Message("postgres client unavailable".to_string()));
        };
        match f(client) {
            Ok(v) => Ok(v),
            Err(err) => {
                *slot = None;
                Err(err.into())
            }
        }
    }
}

impl RelationalStore for PostgresRelationalStore {
    fn max_id(&self) -> StoreResult<Option<RecordId>> {
        self.with_client(|client| {
            let row = client.query_one(MAX_ID, &[])?;
            row.try_get::<_, Option<i64>>(0)
        })
    }

    fn insert(&self, record: &OperationRecord) -> StoreResult<()> {
        let arguments = encode_arguments(&record.arguments)?;
        self.with_client(|client| {
            client.execute(
                INSERT,
                &[
                    &record.id,
                    &record.flavor.as_str(),
                    &record.operation,
                    &record.result,
                    &arguments,
                ],
            )?;
            Ok(())
        })
    }

    fn select_all(&self) -> StoreResult<Vec<OperationRecord>> {
        let rows = self.with_client(|client| {
            client.query(SELECT_ALL, &[])
        })?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let flavor: String = row.try_get(1)?;
            let flavor = Flavor::parse(&flavor).ok_or(DecodeError::Flavor(flavor))?;
            let arguments: String = row.try_get(4)?;
            out.push(OperationRecord {
                id: row.try_get(0)?,
                flavor,
                operation: row.try_get(2)?,
                result: row.try_get(3)?,
                arguments: decode_arguments(&arguments).map_err(DecodeError::from)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_columns_are_read_and_written_as_int8() {
        assert!(MAX_ID.contains("MAX(rawid)::BIGINT"));
        assert!(INSERT.contains("$1::BIGINT") && INSERT.contains("$4::BIGINT"));
        assert!(SELECT_ALL.contains("rawid::BIGINT") && SELECT_ALL.contains("result::BIGINT"));
    }
}

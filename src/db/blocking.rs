//! Blocking handler on top of the driver's `sync` client.
//!
//! Every call parks the calling thread until the server answers. Call it
//! from a blocking context (`spawn_blocking`, `block_in_place`), never
//! directly from an async task.

use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::sync::{Client, Database};

use crate::config::MongoConfig;
use crate::error::BenchResult;

use super::credentials::{self, Credentials};
use super::payload::{InsertAck, RecordPayload};
use super::{DatabaseName, TableName};

pub struct BlockingHandler {
    db: Database,
    database: DatabaseName,
}

impl BlockingHandler {
    /// Resolve credentials, build the client and bind `database`.
    pub fn connect(config: &MongoConfig, database: DatabaseName) -> BenchResult<Self> {
        let creds = credentials::resolve(config);
        let client = Self::initialize_client(&creds)?;
        let db = client.database(database.as_str());

        if config.connect_eagerly {
            db.run_command(doc! { "ping": 1 }).run()?;
            tracing::info!(
                "Blocking client connected to {} (database {})",
                creds.redacted(),
                database
            );
        } else {
            tracing::info!(
                "Blocking client created for {} (database {}), connection deferred",
                creds.redacted(),
                database
            );
        }

        Ok(Self { db, database })
    }

    fn initialize_client(creds: &Credentials) -> BenchResult<Client> {
        let mut options = ClientOptions::parse(creds.connection_string().as_str()).run()?;
        creds.apply(&mut options);
        Ok(Client::with_options(options)?)
    }

    pub fn database(&self) -> DatabaseName {
        self.database
    }

    /// Insert one record into `table`. A payload that fails to decode is
    /// rejected before anything is sent.
    pub fn set(&self, table: TableName, value: RecordPayload) -> BenchResult<InsertAck> {
        let record = value.into_document()?;
        let collection = self.db.collection::<Document>(table.as_str());
        let result = collection.insert_one(record).run()?;

        tracing::debug!("Inserted into {}.{} (blocking)", self.database, table);
        Ok(InsertAck::new(collection.write_concern(), &result.inserted_id))
    }

    /// Every document in `table`, without `_id`.
    pub fn get_all(&self, table: TableName) -> BenchResult<Vec<Document>> {
        let cursor = self
            .db
            .collection::<Document>(table.as_str())
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .run()?;

        let documents = cursor.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            "Fetched {} documents from {}.{} (blocking)",
            documents.len(),
            self.database,
            table
        );
        Ok(documents)
    }
}

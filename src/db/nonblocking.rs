//! Non-blocking handler on top of the driver's async client.
//!
//! The task suspends at each server round trip and other tasks on the same
//! worker run meanwhile.

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::config::MongoConfig;
use crate::error::BenchResult;

use super::credentials::{self, Credentials};
use super::payload::{InsertAck, RecordPayload};
use super::{DatabaseName, TableName};

pub struct AsyncHandler {
    db: Database,
    database: DatabaseName,
}

impl AsyncHandler {
    /// Resolve credentials, build the client and bind `database`.
    pub async fn connect(config: &MongoConfig, database: DatabaseName) -> BenchResult<Self> {
        let creds = credentials::resolve(config);
        let client = Self::initialize_client(&creds).await?;
        let db = client.database(database.as_str());

        if config.connect_eagerly {
            db.run_command(doc! { "ping": 1 }).await?;
            tracing::info!(
                "Async client connected to {} (database {})",
                creds.redacted(),
                database
            );
        } else {
            tracing::info!(
                "Async client created for {} (database {}), connection deferred",
                creds.redacted(),
                database
            );
        }

        Ok(Self { db, database })
    }

    async fn initialize_client(creds: &Credentials) -> BenchResult<Client> {
        let mut options = ClientOptions::parse(creds.connection_string().as_str()).await?;
        creds.apply(&mut options);
        Ok(Client::with_options(options)?)
    }

    pub fn database(&self) -> DatabaseName {
        self.database
    }

    /// Insert one record into `table`. A payload that fails to decode is
    /// rejected before anything is sent.
    pub async fn set(&self, table: TableName, value: RecordPayload) -> BenchResult<InsertAck> {
        let record = value.into_document()?;
        let collection = self.db.collection::<Document>(table.as_str());
        let result = collection.insert_one(record).await?;

        tracing::debug!("Inserted into {}.{} (async)", self.database, table);
        Ok(InsertAck::new(collection.write_concern(), &result.inserted_id))
    }

    /// Every document in `table`, without `_id`, pulled batch by batch from
    /// the server cursor.
    pub async fn get_all(&self, table: TableName) -> BenchResult<Vec<Document>> {
        let mut cursor = self
            .db
            .collection::<Document>(table.as_str())
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .await?;

        let mut documents = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            documents.push(document);
        }

        tracing::debug!(
            "Fetched {} documents from {}.{} (async)",
            documents.len(),
            self.database,
            table
        );
        Ok(documents)
    }
}

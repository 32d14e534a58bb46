//! MongoDB driver handlers
//!
//! Two interchangeable handlers share one capability set (`set` / `get_all`):
//!
//! - [`BlockingHandler`] wraps the driver's `sync` client. Each call holds the
//!   calling thread until the server answers.
//! - [`AsyncHandler`] wraps the async client. Each call suspends the task at
//!   the network round trip.
//!
//! [`Handler`] is the closed union of both; [`HandlerManager`] owns the
//! memoized instances.

pub mod blocking;
pub mod credentials;
pub mod manager;
pub mod nonblocking;
pub mod payload;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use mongodb::bson::Document;

use crate::error::{BenchError, BenchResult};

pub use blocking::BlockingHandler;
pub use credentials::Credentials;
pub use manager::{HandlerKey, HandlerManager};
pub use nonblocking::AsyncHandler;
pub use payload::{InsertAck, Record, RecordPayload};

/// Application name reported to the server in the handshake
pub const APP_NAME: &str = "mongobench";

/// Logical databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseName {
    #[default]
    Testing,
}

impl DatabaseName {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseName::Testing => "testing",
        }
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseName {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testing" => Ok(DatabaseName::Testing),
            other => Err(BenchError::UnknownDatabase(other.to_string())),
        }
    }
}

/// Logical collections. Writes and reads go to different tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    GetUser,
    PostUser,
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::GetUser => "get_user",
            TableName::PostUser => "post_user",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver selected per request.
///
/// The wire labels are the ones the HTTP routes and load scripts use:
/// `pymongo` for the blocking client, `motor` for the non-blocking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DriverKind {
    #[default]
    Blocking,
    NonBlocking,
}

impl DriverKind {
    pub const ALL: [DriverKind; 2] = [DriverKind::Blocking, DriverKind::NonBlocking];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Blocking => "pymongo",
            DriverKind::NonBlocking => "motor",
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DriverKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BenchError::UnknownDriver(s.to_string()))
    }
}

impl Serialize for DriverKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DriverKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A live handler bound to one (database, driver kind) pair.
pub enum Handler {
    Blocking(BlockingHandler),
    NonBlocking(AsyncHandler),
}

impl Handler {
    pub fn kind(&self) -> DriverKind {
        match self {
            Handler::Blocking(_) => DriverKind::Blocking,
            Handler::NonBlocking(_) => DriverKind::NonBlocking,
        }
    }

    pub fn database(&self) -> DatabaseName {
        match self {
            Handler::Blocking(h) => h.database(),
            Handler::NonBlocking(h) => h.database(),
        }
    }

    /// Narrow to the blocking variant, for callers that run on a blocking thread.
    pub fn blocking(&self) -> BenchResult<&BlockingHandler> {
        match self {
            Handler::Blocking(h) => Ok(h),
            Handler::NonBlocking(_) => Err(BenchError::Internal(format!(
                "handler for {} is not blocking",
                self.kind()
            ))),
        }
    }

    /// Insert one record.
    ///
    /// The blocking arm keeps the current runtime worker busy for the whole
    /// round trip; requires the multi-threaded runtime.
    pub async fn set(&self, table: TableName, value: RecordPayload) -> BenchResult<InsertAck> {
        match self {
            Handler::Blocking(h) => tokio::task::block_in_place(|| h.set(table, value)),
            Handler::NonBlocking(h) => h.set(table, value).await,
        }
    }

    /// Fetch every record of `table` without the `_id` field.
    pub async fn get_all(&self, table: TableName) -> BenchResult<Vec<Document>> {
        match self {
            Handler::Blocking(h) => tokio::task::block_in_place(|| h.get_all(table)),
            Handler::NonBlocking(h) => h.get_all(table).await,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("kind", &self.kind())
            .field("database", &self.database())
            .finish()
    }
}

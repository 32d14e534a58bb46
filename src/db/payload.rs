use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::{Acknowledgment, WriteConcern};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BenchError, BenchResult};

/// Body accepted by the write routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub user_id: i64,
}

/// Input of a `set` call: an already structured document or JSON text that
/// must decode to an object.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Document(Document),
    Json(String),
}

impl RecordPayload {
    /// Decode into the document that will be inserted.
    ///
    /// Malformed JSON, or JSON that is not an object, is a parse error.
    pub fn into_document(self) -> BenchResult<Document> {
        match self {
            RecordPayload::Document(doc) => Ok(doc),
            RecordPayload::Json(text) => {
                let map: Map<String, Value> = serde_json::from_str(&text)
                    .map_err(|e| BenchError::Parse(e.to_string()))?;
                Ok(bson::to_document(&map)?)
            }
        }
    }
}

impl From<Document> for RecordPayload {
    fn from(doc: Document) -> Self {
        RecordPayload::Document(doc)
    }
}

impl From<String> for RecordPayload {
    fn from(text: String) -> Self {
        RecordPayload::Json(text)
    }
}

impl From<&str> for RecordPayload {
    fn from(text: &str) -> Self {
        RecordPayload::Json(text.to_string())
    }
}

impl From<Record> for RecordPayload {
    fn from(record: Record) -> Self {
        RecordPayload::Document(doc! { "user_id": record.user_id })
    }
}

/// Result of an insert: whether the server acknowledged it and the id it got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertAck {
    pub ack: bool,
    pub id: String,
}

impl InsertAck {
    /// Build the result of an insert made under `write_concern`.
    ///
    /// The driver returns `Ok` for `w: 0` writes without waiting for the
    /// server, so those report `ack: false`.
    pub fn new(write_concern: Option<&WriteConcern>, inserted_id: &Bson) -> Self {
        Self {
            ack: is_acknowledged(write_concern),
            id: render_id(inserted_id),
        }
    }
}

/// Whether a write under `write_concern` waits for the server's answer.
/// `w: 0` is unacknowledged unless journaling was requested.
pub fn is_acknowledged(write_concern: Option<&WriteConcern>) -> bool {
    write_concern.map_or(true, |wc| {
        wc.w != Some(Acknowledgment::Nodes(0)) || wc.journal == Some(true)
    })
}

fn render_id(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

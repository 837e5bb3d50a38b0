use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response represents the outcome of a document write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

/// ErrorReason is the `{"error": .., "reason": ..}` body CouchDB sends with failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorReason {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub reason: String,
}

impl ErrorReason {
    /// Parse an error body, falling back to an empty reason
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// "error: reason", or whichever half is present
    pub fn message(&self) -> String {
        match (self.error.is_empty(), self.reason.is_empty()) {
            (false, false) => format!("{}: {}", self.error, self.reason),
            (false, true) => self.error.clone(),
            (true, false) => self.reason.clone(),
            (true, true) => String::new(),
        }
    }
}

/// DocumentMeta holds the `_id` and `_rev` of a serialized document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    pub id: Option<String>,
    pub rev: Option<String>,
}

/// Why `_id`/`_rev` could not be read from a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentMetaError {
    #[error("document must serialize to a JSON object")]
    NotAnObject,

    #[error("{0} must be a string")]
    NotAString(&'static str),
}

impl DocumentMeta {
    /// Read `_id`/`_rev` from a document.
    ///
    /// Missing, `null` or empty values count as absent; any other
    /// non-string value is an error.
    pub fn from_json(doc: &serde_json::Value) -> Result<Self, DocumentMetaError> {
        let object = doc.as_object().ok_or(DocumentMetaError::NotAnObject)?;
        let field = |name: &'static str| match object.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(DocumentMetaError::NotAString(name)),
        };

        Ok(Self {
            id: field("_id")?,
            rev: field("_rev")?,
        })
    }
}

/// Fresh document id: a v4 UUID as 32 lowercase hex chars
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// DbInfo is the database information document served at `/{db}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbInfo {
    pub db_name: String,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(default)]
    pub doc_del_count: u64,
    // number on 1.x servers, opaque string on 2.x and later
    #[serde(default)]
    pub update_seq: serde_json::Value,
    #[serde(default)]
    pub compact_running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_start_time: Option<String>,
}

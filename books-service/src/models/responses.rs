use crate::models::book::BookFields;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
    pub index: String,
    pub checked_at: String,
}

/// Error body returned by the index engine on non-success responses.
#[derive(Debug, Deserialize)]
pub struct EngineErrorResponse {
    pub error: EngineErrorDetail,
}

/// `error` is usually an object, but some engine responses send a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EngineErrorDetail {
    Cause {
        #[serde(rename = "type")]
        kind: String,
        reason: Option<String>,
    },
    Message(String),
}

impl EngineErrorDetail {
    pub fn describe(&self) -> String {
        match self {
            EngineErrorDetail::Cause {
                kind,
                reason: Some(reason),
            } => format!("{}: {}", kind, reason),
            EngineErrorDetail::Cause { kind, reason: None } => kind.clone(),
            EngineErrorDetail::Message(message) => message.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexDocumentResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
pub struct GetDocumentResponse {
    pub found: bool,
    #[serde(rename = "_source")]
    pub source: Option<BookFields>,
}

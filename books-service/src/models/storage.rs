use crate::models::book::{check_mappings, merge_fields, Book, BookFields};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Index engine returned {status}: {reason}")]
    Engine { status: u16, reason: String },
    #[error("Document {0} not found")]
    NotFound(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Invalid document id {0:?}")]
    InvalidId(String),
}

/// Rejects ids that cannot be addressed as a URL path segment. `.` and `..`
/// are dot segments in every encoding, so a request for them would resolve
/// to the index itself.
pub fn check_id(id: &str) -> Result<(), IndexError> {
    match id {
        "." | ".." => Err(IndexError::InvalidId(id.to_string())),
        _ => Ok(()),
    }
}

/// What the engine did with an indexed document. Indexing is an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Created,
    Updated,
}

/// Shared handle to the configured index, injected into handlers as state.
pub type Backend = Arc<dyn BookIndex + Send + Sync>;

#[async_trait]
pub trait BookIndex {
    async fn index_book(&self, id: &str, book: &Book) -> Result<IndexOutcome, IndexError>;
    async fn get_book(&self, id: &str) -> Result<Option<Book>, IndexError>;
    async fn update_book(&self, id: &str, fields: &BookFields) -> Result<(), IndexError>;
    async fn delete_book(&self, id: &str) -> Result<(), IndexError>;
    async fn test_connection(&self) -> Result<(), IndexError>;
    fn index_name(&self) -> &str;
}

/// In-process index with the engine's document semantics. Used for local
/// runs (`BACKEND_TYPE=memory`) and tests.
pub struct MemoryBackend {
    index: String,
    documents: RwLock<HashMap<String, BookFields>>,
}

impl MemoryBackend {
    pub fn new(index: &str) -> Self {
        Self {
            index: index.to_string(),
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Raw stored source, including fields outside the `Book` shape.
    pub async fn source(&self, id: &str) -> Option<BookFields> {
        self.documents.read().await.get(id).cloned()
    }
}

#[async_trait]
impl BookIndex for MemoryBackend {
    async fn index_book(&self, id: &str, book: &Book) -> Result<IndexOutcome, IndexError> {
        check_id(id)?;
        let previous = self
            .documents
            .write()
            .await
            .insert(id.to_string(), book.to_source());

        Ok(match previous {
            Some(_) => IndexOutcome::Updated,
            None => IndexOutcome::Created,
        })
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, IndexError> {
        check_id(id)?;
        let documents = self.documents.read().await;

        Ok(documents.get(id).map(Book::from_source))
    }

    async fn update_book(&self, id: &str, fields: &BookFields) -> Result<(), IndexError> {
        check_id(id)?;
        let mut documents = self.documents.write().await;

        let source = documents
            .get_mut(id)
            .ok_or_else(|| IndexError::NotFound(id.to_string()))?;

        let mut merged = source.clone();
        merge_fields(&mut merged, fields);
        check_mappings(&merged).map_err(|reason| IndexError::Engine {
            status: 400,
            reason,
        })?;
        *source = merged;

        Ok(())
    }

    async fn delete_book(&self, id: &str) -> Result<(), IndexError> {
        check_id(id)?;
        match self.documents.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(IndexError::NotFound(id.to_string())),
        }
    }

    async fn test_connection(&self) -> Result<(), IndexError> {
        Ok(())
    }

    fn index_name(&self) -> &str {
        &self.index
    }
}

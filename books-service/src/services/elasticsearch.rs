use crate::models::book::{Book, BookFields};
use crate::models::responses::{EngineErrorResponse, GetDocumentResponse, IndexDocumentResponse};
use crate::models::storage::{check_id, BookIndex, IndexError, IndexOutcome};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;
use tracing::debug;

/// Elasticsearch document API client for a single index.
///
/// One instance is built at startup and shared by every request; the inner
/// `reqwest::Client` pools connections.
pub struct ElasticsearchBackend {
    client: Client,
    base_url: String,
    index: String,
}

impl ElasticsearchBackend {
    pub fn new(base_url: &str, index: &str) -> Result<Self, IndexError> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, index))
    }

    pub fn with_client(client: Client, base_url: &str, index: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        }
    }

    fn document_url(&self, endpoint: &str, id: &str) -> Result<String, IndexError> {
        check_id(id)?;
        Ok(format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.index,
            endpoint,
            urlencoding::encode(id)
        ))
    }
}

async fn engine_error(response: Response) -> IndexError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    IndexError::Engine {
        status,
        reason: describe_error_body(&body),
    }
}

fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<EngineErrorResponse>(body) {
        Ok(parsed) => parsed.error.describe(),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl BookIndex for ElasticsearchBackend {
    async fn index_book(&self, id: &str, book: &Book) -> Result<IndexOutcome, IndexError> {
        let response = self
            .client
            .put(self.document_url("_doc", id)?)
            .query(&[("refresh", "wait_for")])
            .json(book)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(engine_error(response).await);
        }

        let body: IndexDocumentResponse = response.json().await?;
        debug!("Index {} result for {}: {}", self.index, id, body.result);

        Ok(match body.result.as_str() {
            "created" => IndexOutcome::Created,
            _ => IndexOutcome::Updated,
        })
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>, IndexError> {
        let response = self.client.get(self.document_url("_doc", id)?).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // A missing index also answers 404, with an error body instead of `found`.
            return Ok(None);
        }
        if !status.is_success() {
            return Err(engine_error(response).await);
        }

        let body: GetDocumentResponse = response.json().await?;
        match (body.found, body.source) {
            (true, Some(source)) => Ok(Some(Book::from_source(&source))),
            _ => Ok(None),
        }
    }

    async fn update_book(&self, id: &str, fields: &BookFields) -> Result<(), IndexError> {
        let response = self
            .client
            .post(self.document_url("_update", id)?)
            .json(&json!({ "doc": fields }))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(IndexError::NotFound(id.to_string())),
            status if status.is_success() => Ok(()),
            _ => Err(engine_error(response).await),
        }
    }

    async fn delete_book(&self, id: &str) -> Result<(), IndexError> {
        let response = self
            .client
            .delete(self.document_url("_doc", id)?)
            .query(&[("refresh", "wait_for")])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(IndexError::NotFound(id.to_string())),
            status if status.is_success() => Ok(()),
            _ => Err(engine_error(response).await),
        }
    }

    async fn test_connection(&self) -> Result<(), IndexError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .map_err(|e| IndexError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexError::Connection(format!(
                "{} answered {}",
                self.base_url,
                response.status()
            )));
        }

        Ok(())
    }

    fn index_name(&self) -> &str {
        &self.index
    }
}

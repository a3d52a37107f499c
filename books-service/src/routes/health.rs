use crate::models::responses::HealthResponse;
use crate::models::storage::Backend;
use axum::{extract::State, response::Json};
use chrono::Utc;

pub async fn health_check(State(backend): State<Backend>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "books-service".to_string(),
        status: "running".to_string(),
        index: backend.index_name().to_string(),
        checked_at: Utc::now().to_rfc3339(),
    })
}

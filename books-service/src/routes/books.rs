use crate::models::book::{fields_from_payload, Book};
use crate::models::storage::{Backend, IndexError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info, warn};

fn plain(status: StatusCode, message: String) -> Response {
    (status, message + "\n").into_response()
}

fn invalid_input(id: &str, e: serde_json::Error) -> Response {
    warn!("Rejected payload for book {}: {}", id, e);
    plain(StatusCode::BAD_REQUEST, "Invalid input".to_string())
}

fn index_failure(action: &str, id: &str, e: IndexError) -> Response {
    match e {
        IndexError::InvalidId(_) => {
            warn!("Rejected book id {:?} on {}", id, action);
            plain(StatusCode::BAD_REQUEST, "Invalid input".to_string())
        }
        IndexError::NotFound(_) => {
            warn!("Book {} not found on {}", id, action);
            plain(StatusCode::NOT_FOUND, "Book not found".to_string())
        }
        e => {
            error!("Failed to {} book {}: {}", action, id, e);
            plain(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {} book", action),
            )
        }
    }
}

pub async fn create_book(
    Path(id): Path<String>,
    State(backend): State<Backend>,
    body: Bytes,
) -> Response {
    let book = match Book::from_payload(&body) {
        Ok(book) => book,
        Err(e) => return invalid_input(&id, e),
    };

    match backend.index_book(&id, &book).await {
        Ok(outcome) => {
            info!("Indexed book {} ({:?})", id, outcome);
            plain(StatusCode::CREATED, format!("Book with ID {} created", id))
        }
        Err(e) => index_failure("create", &id, e),
    }
}

pub async fn get_book(Path(id): Path<String>, State(backend): State<Backend>) -> Response {
    match backend.get_book(&id).await {
        Ok(Some(book)) => Json(book).into_response(),
        Ok(None) => index_failure("get", &id, IndexError::NotFound(id.clone())),
        Err(e) => index_failure("get", &id, e),
    }
}

pub async fn update_book(
    Path(id): Path<String>,
    State(backend): State<Backend>,
    body: Bytes,
) -> Response {
    let fields = match fields_from_payload(&body) {
        Ok(fields) => fields,
        Err(e) => return invalid_input(&id, e),
    };

    match backend.update_book(&id, &fields).await {
        Ok(()) => {
            info!("Updated book {} ({} fields)", id, fields.len());
            plain(StatusCode::OK, format!("Book with ID {} updated", id))
        }
        Err(e) => index_failure("update", &id, e),
    }
}

pub async fn delete_book(Path(id): Path<String>, State(backend): State<Backend>) -> Response {
    match backend.delete_book(&id).await {
        Ok(()) => {
            info!("Deleted book {}", id);
            plain(StatusCode::OK, format!("Book with ID {} deleted", id))
        }
        Err(e) => index_failure("delete", &id, e),
    }
}

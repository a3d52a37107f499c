pub mod config;
pub mod models;
pub mod routes;
pub mod services;

use axum::{routing::get, Router};
use models::storage::Backend;
use routes::{
    books::{create_book, delete_book, get_book, update_book},
    health::health_check,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(backend: Backend) -> Router {
    Router::new()
        .route("/status", get(health_check))
        .route(
            "/books/:id",
            get(get_book)
                .post(create_book)
                .put(update_book)
                .delete(delete_book),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(backend)
}

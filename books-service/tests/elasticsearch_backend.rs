use books_service::models::book::Book;
use books_service::models::storage::{BookIndex, IndexError, IndexOutcome};
use books_service::services::elasticsearch::ElasticsearchBackend;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dune() -> Book {
    Book {
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        year: 1965,
    }
}

async fn backend_for(server: &MockServer) -> ElasticsearchBackend {
    ElasticsearchBackend::new(&server.uri(), "books").expect("client builds")
}

#[tokio::test]
async fn index_puts_document_and_waits_for_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/books/_doc/1"))
        .and(query_param("refresh", "wait_for"))
        .and(body_json(json!({"title": "Dune", "author": "Frank Herbert", "year": 1965})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"_id": "1", "result": "created"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend_for(&server).await.index_book("1", &dune()).await.unwrap();

    assert_eq!(outcome, IndexOutcome::Created);
}

#[tokio::test]
async fn index_over_existing_document_reports_update() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/books/_doc/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "1", "result": "updated"})),
        )
        .mount(&server)
        .await;

    let outcome = backend_for(&server).await.index_book("1", &dune()).await.unwrap();

    assert_eq!(outcome, IndexOutcome::Updated);
}

#[tokio::test]
async fn index_failure_carries_engine_reason() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/books/_doc/1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"type": "mapper_parsing_exception", "reason": "failed to parse field [year]"},
            "status": 400
        })))
        .mount(&server)
        .await;

    let err = backend_for(&server).await.index_book("1", &dune()).await.unwrap_err();

    match err {
        IndexError::Engine { status, reason } => {
            assert_eq!(status, 400);
            assert!(reason.contains("mapper_parsing_exception"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn get_decodes_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/_doc/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": "books",
            "_id": "1",
            "found": true,
            "_source": {"title": "Dune", "author": "Frank Herbert", "year": 1965}
        })))
        .mount(&server)
        .await;

    let book = backend_for(&server).await.get_book("1").await.unwrap();

    assert_eq!(book, Some(dune()));
}

#[tokio::test]
async fn get_tolerates_null_and_coerced_source_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/_doc/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": "books",
            "_id": "1",
            "found": true,
            "_source": {"title": null, "author": "Frank Herbert", "year": "1966"}
        })))
        .mount(&server)
        .await;

    let book = backend_for(&server).await.get_book("1").await.unwrap();

    assert_eq!(
        book,
        Some(Book {
            title: String::new(),
            author: "Frank Herbert".to_string(),
            year: 1966,
        })
    );
}

#[tokio::test]
async fn get_missing_document_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/_doc/2"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"_index": "books", "_id": "2", "found": false})),
        )
        .mount(&server)
        .await;

    let book = backend_for(&server).await.get_book("2").await.unwrap();

    assert_eq!(book, None);
}

#[tokio::test]
async fn get_engine_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/_doc/1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = backend_for(&server).await.get_book("1").await.unwrap_err();

    assert!(matches!(err, IndexError::Engine { status: 503, .. }));
}

#[tokio::test]
async fn update_sends_partial_doc() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books/_update/1"))
        .and(body_json(json!({"doc": {"year": 1966}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "1", "result": "updated"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fields = json!({"year": 1966}).as_object().cloned().unwrap();
    backend_for(&server).await.update_book("1", &fields).await.unwrap();
}

#[tokio::test]
async fn update_missing_document_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books/_update/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"type": "document_missing_exception", "reason": "[9]: document missing"},
            "status": 404
        })))
        .mount(&server)
        .await;

    let fields = json!({"year": 1966}).as_object().cloned().unwrap();
    let err = backend_for(&server).await.update_book("9", &fields).await.unwrap_err();

    assert!(matches!(err, IndexError::NotFound(id) if id == "9"));
}

#[tokio::test]
async fn delete_waits_for_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/books/_doc/1"))
        .and(query_param("refresh", "wait_for"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "1", "result": "deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server).await.delete_book("1").await.unwrap();
}

#[tokio::test]
async fn delete_missing_document_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/books/_doc/1"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"_id": "1", "result": "not_found"})),
        )
        .mount(&server)
        .await;

    let err = backend_for(&server).await.delete_book("1").await.unwrap_err();

    assert!(matches!(err, IndexError::NotFound(_)));
}

#[tokio::test]
async fn test_connection_pings_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"tagline": "You Know, for Search"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    backend_for(&server).await.test_connection().await.unwrap();
}

#[tokio::test]
async fn test_connection_fails_on_unhealthy_engine() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend_for(&server).await.test_connection().await.unwrap_err();

    assert!(matches!(err, IndexError::Connection(_)));
}

#[tokio::test]
async fn unreachable_engine_is_a_connection_error() {
    let backend = ElasticsearchBackend::new("http://127.0.0.1:1", "books").unwrap();

    let err = backend.test_connection().await.unwrap_err();

    assert!(matches!(err, IndexError::Connection(_)));
}

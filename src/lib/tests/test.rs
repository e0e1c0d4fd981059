use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use crate::adapters::{router, HttpServer};
use crate::client::{ClientError, TodoClient};
use crate::core::{Todo, UpdateTodo};
use crate::storage::memory::MemoryTodoStore;
use crate::storage::sqlite::SqliteTodoStore;

fn app() -> axum::Router {
    router(Arc::new(MemoryTodoStore::new()))
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_todos_starts_empty() {
    let resp = app().oneshot(get_request("/todos")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn create_todo_returns_201_with_defaults() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Test Todo"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.title, "Test Todo");
    assert!(!todo.completed);
    assert!(todo.id > 0);
}

#[tokio::test]
async fn get_todo_by_id_roundtrip() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Fetch me"}"#))
        .await
        .unwrap();
    let created: Todo = body_json(resp).await;

    let resp = app
        .oneshot(get_request(&format!("/todos/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_unknown_id_returns_404() {
    let resp = app().oneshot(get_request("/todos/424242")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_malformed_id_is_a_client_error() {
    let resp = app()
        .oneshot(get_request("/todos/not-a-number"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_applies_partial_update() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Original"}"#))
        .await
        .unwrap();
    let created: Todo = body_json(resp).await;

    let resp = app
        .oneshot(json_request(
            "PUT",
            &format!("/todos/{}", created.id),
            r#"{"completed":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Original");
    assert!(updated.completed);
}

#[tokio::test]
async fn put_unknown_id_returns_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos/9000", r#"{"completed":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_returns_404() {
    let app = app();
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Short lived"}"#))
        .await
        .unwrap();
    let created: Todo = body_json(resp).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/todos/{}", created.id))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(get_request(&format!("/todos/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_unknown_id_returns_404() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/todos/31337")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_route_is_ok() {
    let resp = app().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn sqlite_backed_router_serves_created_records() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let store = SqliteTodoStore::new(pool);
    store.migrate().await.unwrap();
    let app = router(Arc::new(store));

    let resp = app
        .clone()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Durable"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;

    let resp = app.oneshot(get_request("/todos")).await.unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos, vec![created]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn client_mirrors_server_state() -> Result<(), Box<dyn std::error::Error>> {
    // Port 0 picks a free ephemeral port.
    let server = HttpServer::new(Arc::new(MemoryTodoStore::new()), "127.0.0.1:0").await?;
    let addr = server.local_addr()?;
    let server_handle = tokio::spawn(server.run());

    let mut client = TodoClient::new(&format!("http://{}", addr));
    assert!(client.fetch_todos().await?.is_empty());

    let first = client.add_todo("Buy milk").await?;
    let second = client.add_todo("Walk dog").await?;
    assert_eq!(client.todos().len(), 2);
    assert!(!first.completed);

    let toggled = client.toggle_todo(first.id).await?;
    assert!(toggled.completed);
    assert!(client.todos().iter().any(|t| t.id == first.id && t.completed));

    let renamed = client
        .update_todo(
            second.id,
            UpdateTodo {
                title: Some("Walk the dog".to_string()),
                completed: None,
            },
        )
        .await?;
    assert_eq!(renamed.title, "Walk the dog");

    client.delete_todo(first.id).await?;
    assert_eq!(client.todos().len(), 1);
    match client.get_todo(first.id).await {
        Err(ClientError::NotFound) => {}
        other => panic!("expected NotFound, got {:?}", other.map(|t| t.id)),
    }

    let remaining = client.fetch_todos().await?.to_vec();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Walk the dog");

    server_handle.abort();
    Ok(())
}

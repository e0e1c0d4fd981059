use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{CreateTodo, Todo, TodoError, UpdateTodo};
use crate::storage::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, TodoError> {
    Ok(Json(state.store.find_all().await?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    Json(body): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), TodoError> {
    let todo = state.store.create(body).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, TodoError> {
    let todo = state
        .store
        .find_one(id)
        .await?
        .ok_or(TodoError::NotFound(id))?;
    Ok(Json(todo))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(changes): Json<UpdateTodo>,
) -> Result<Json<Todo>, TodoError> {
    let todo = state
        .store
        .update(id, changes)
        .await?
        .ok_or(TodoError::NotFound(id))?;
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, TodoError> {
    state
        .store
        .delete(id)
        .await?
        .ok_or(TodoError::NotFound(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health_route() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Build the full application router around a store instance.
pub fn router(store: Arc<dyn TodoStore>) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request<_>| {
            let uri = request.uri().to_string();
            tracing::info_span!("http_request", method = ?request.method(), uri)
        });

    Router::new()
        .route("/health", get(health_route))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}

pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    pub async fn new(store: Arc<dyn TodoStore>, addr: &str) -> anyhow::Result<Self> {
        let listener = net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to listen on {}", addr))?;
        Ok(Self {
            router: router(store),
            listener,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("listener has no local address")
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!("listening on {}", self.local_addr()?);
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::{Sqlite, SqlitePool};

use crate::core::{CreateTodo, Todo, TodoError, UpdateTodo};
use crate::storage::TodoStore;

/// SQLite-backed store. Concurrency safety is delegated to SQLite's own
/// locking; each operation is one statement against the pool.
#[derive(Clone)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the database file if needed) and apply the schema.
    pub async fn connect(url: &str) -> Result<Self, TodoError> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            tracing::info!("creating database {}", url);
            Sqlite::create_database(url).await?;
        }
        let pool = SqlitePool::connect(url).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), TodoError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn create(&self, new: CreateTodo) -> Result<Todo, TodoError> {
        let todo = Todo::new(0, new.title);
        let stored = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (title, completed, created_at) VALUES (?, ?, ?)
             RETURNING id, title, completed, created_at",
        )
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.created_at)
        .fetch_one(&self.pool)
        .await?;
        tracing::debug!(id = stored.id, "created todo");
        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, completed, created_at FROM todos ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn find_one(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, title, completed, created_at FROM todos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn update(&self, id: i64, changes: UpdateTodo) -> Result<Option<Todo>, TodoError> {
        // COALESCE keeps the stored value where the caller sent nothing,
        // making the partial update a single atomic statement.
        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos
             SET title = COALESCE(?, title), completed = COALESCE(?, completed)
             WHERE id = ?
             RETURNING id, title, completed, created_at",
        )
        .bind(changes.title)
        .bind(changes.completed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn delete(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        let todo = sqlx::query_as::<_, Todo>(
            "DELETE FROM todos WHERE id = ?
             RETURNING id, title, completed, created_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        if todo.is_some() {
            tracing::debug!(id, "deleted todo");
        }
        Ok(todo)
    }
}

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::core::{CreateTodo, Todo, TodoError, UpdateTodo};

/// Storage access for todo records. Every operation is a single atomic
/// request to the backing store; absence is an `Ok(None)`, never an error.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist a new record and return it with its assigned id.
    async fn create(&self, new: CreateTodo) -> Result<Todo, TodoError>;

    /// All records in insertion order. An empty store yields an empty vec.
    async fn find_all(&self) -> Result<Vec<Todo>, TodoError>;

    async fn find_one(&self, id: i64) -> Result<Option<Todo>, TodoError>;

    /// Apply a partial update and return the post-update record, or `None`
    /// if the id does not exist. Never creates a record.
    async fn update(&self, id: i64, changes: UpdateTodo) -> Result<Option<Todo>, TodoError>;

    /// Remove a record, returning it, or `None` if the id did not exist.
    async fn delete(&self, id: i64) -> Result<Option<Todo>, TodoError>;
}

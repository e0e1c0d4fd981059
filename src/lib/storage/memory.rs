use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::{CreateTodo, Todo, TodoError, UpdateTodo};
use crate::storage::TodoStore;

/// In-memory store keyed by id. Ids are assigned from a counter, so map
/// order and insertion order coincide. Used in tests and as a zero-setup
/// backend.
pub struct MemoryTodoStore {
    todos: Mutex<BTreeMap<i64, Todo>>,
    next_id: AtomicI64,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self {
            todos: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(&self, new: CreateTodo) -> Result<Todo, TodoError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let todo = Todo::new(id, new.title);
        self.todos.lock().await.insert(id, todo.clone());
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, TodoError> {
        Ok(self.todos.lock().await.values().cloned().collect())
    }

    async fn find_one(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        Ok(self.todos.lock().await.get(&id).cloned())
    }

    async fn update(&self, id: i64, changes: UpdateTodo) -> Result<Option<Todo>, TodoError> {
        let mut todos = self.todos.lock().await;
        Ok(todos.get_mut(&id).map(|todo| {
            changes.apply(todo);
            todo.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        Ok(self.todos.lock().await.remove(&id))
    }
}

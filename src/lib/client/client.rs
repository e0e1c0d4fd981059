use thiserror::Error;

use crate::core::{CreateTodo, Todo, UpdateTodo};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("todo not found")]
    NotFound,
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Typed client for the todo API that keeps a local mirror of the
/// collection, adjusted after every successful call. `todos()` exposes the
/// mirror so a caller can render state without re-fetching.
pub struct TodoClient {
    http: reqwest::Client,
    base_url: String,
    todos: Vec<Todo>,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            todos: Vec::new(),
        }
    }

    /// The local mirror as of the last successful operation.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// Refresh the mirror from the server.
    pub async fn fetch_todos(&mut self) -> Result<&[Todo], ClientError> {
        let response = self
            .http
            .get(format!("{}/todos", self.base_url))
            .send()
            .await?;
        let response = check_status(response, 200)?;
        self.todos = response.json().await?;
        Ok(&self.todos)
    }

    pub async fn add_todo(&mut self, title: &str) -> Result<Todo, ClientError> {
        let response = self
            .http
            .post(format!("{}/todos", self.base_url))
            .json(&CreateTodo {
                title: title.to_string(),
            })
            .send()
            .await?;
        let response = check_status(response, 201)?;
        let todo: Todo = response.json().await?;
        self.todos.push(todo.clone());
        Ok(todo)
    }

    pub async fn get_todo(&self, id: i64) -> Result<Todo, ClientError> {
        let response = self
            .http
            .get(format!("{}/todos/{id}", self.base_url))
            .send()
            .await?;
        let response = check_status(response, 200)?;
        Ok(response.json().await?)
    }

    pub async fn update_todo(
        &mut self,
        id: i64,
        changes: UpdateTodo,
    ) -> Result<Todo, ClientError> {
        let response = self
            .http
            .put(format!("{}/todos/{id}", self.base_url))
            .json(&changes)
            .send()
            .await?;
        let response = check_status(response, 200)?;
        let updated: Todo = response.json().await?;
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Flip the completion flag, using the mirror (or the server, if the
    /// record is not mirrored yet) to learn the current value.
    pub async fn toggle_todo(&mut self, id: i64) -> Result<Todo, ClientError> {
        let completed = match self.todos.iter().find(|t| t.id == id) {
            Some(todo) => todo.completed,
            None => self.get_todo(id).await?.completed,
        };
        self.update_todo(
            id,
            UpdateTodo {
                title: None,
                completed: Some(!completed),
            },
        )
        .await
    }

    pub async fn delete_todo(&mut self, id: i64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(format!("{}/todos/{id}", self.base_url))
            .send()
            .await?;
        check_status(response, 204)?;
        self.todos.retain(|t| t.id != id);
        Ok(())
    }
}

fn check_status(
    response: reqwest::Response,
    expected: u16,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status().as_u16();
    if status == expected {
        Ok(response)
    } else if status == 404 {
        Err(ClientError::NotFound)
    } else {
        Err(ClientError::UnexpectedStatus(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = TodoClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn mirror_starts_empty() {
        let client = TodoClient::new("http://localhost:3000");
        assert!(client.todos().is_empty());
    }
}

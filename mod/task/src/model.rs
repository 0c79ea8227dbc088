//! Task records and the request/response shapes of the task API.

use serde::{Deserialize, Serialize};
use taskkeeper_core::ServiceError;

/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 30;

/// A task as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Body of `POST /tasks`. Unknown fields are rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_title(&self.title)
    }
}

/// Body of `PUT /tasks/{id}`. Every field is optional; absent fields
/// keep their stored value. Unknown fields are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        Ok(())
    }
}

/// Envelope of `GET /tasks`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Response of `POST /tasks`: the assigned id plus a confirmation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub id: i64,
    pub message: String,
}

/// Confirmation body for update and delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn validate_title(title: &str) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::Validation("title must not be empty".into()));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ServiceError::Validation(format!(
            "title must be at most {TITLE_MAX_LEN} characters"
        )));
    }
    Ok(())
}

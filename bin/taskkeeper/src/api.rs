//! HTTP client for the taskkeeperd API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A task as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Fields to change in an update. `None` leaves the stored value alone
/// and is omitted from the request body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatedTask {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct TaskListResponse {
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// What went wrong talking to the service. `Api` carries what the
/// service said; `Transport` is everything that kept us from hearing it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot reach server: {0}")]
    Transport(String),

    #[error("{message}")]
    Api { status: u16, code: String, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(server: &str) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: server.trim_end_matches('/').to_string() })
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let resp = self.http.get(self.url("/api/tasks")).send().map_err(transport)?;
        let body: TaskListResponse = decode(resp)?;
        Ok(body.tasks)
    }

    pub fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<CreatedTask, ClientError> {
        let mut payload = serde_json::json!({ "title": title });
        if let Some(description) = description {
            payload["description"] = description.into();
        }
        let resp =
            self.http.post(self.url("/api/tasks")).json(&payload).send().map_err(transport)?;
        decode(resp)
    }

    pub fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        let resp =
            self.http.get(self.url(&format!("/api/tasks/{id}"))).send().map_err(transport)?;
        decode(resp)
    }

    /// Returns the service's confirmation message.
    pub fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<String, ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/api/tasks/{id}")))
            .json(patch)
            .send()
            .map_err(transport)?;
        let body: MessageResponse = decode(resp)?;
        Ok(body.message)
    }

    /// Returns the service's confirmation message.
    pub fn delete_task(&self, id: i64) -> Result<String, ClientError> {
        let resp =
            self.http.delete(self.url(&format!("/api/tasks/{id}"))).send().map_err(transport)?;
        let body: MessageResponse = decode(resp)?;
        Ok(body.message)
    }

    pub fn health(&self) -> Result<(), ClientError> {
        let resp = self.http.get(self.url("/health")).send().map_err(transport)?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ClientError::Api {
                status: status.as_u16(),
                code: "UNHEALTHY".into(),
                message: format!("health check returned {status}"),
            })
        }
    }

    pub fn server_version(&self) -> Result<String, ClientError> {
        let resp = self.http.get(self.url("/version")).send().map_err(transport)?;
        let body: VersionResponse = decode(resp)?;
        Ok(body.version)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

fn decode<T: serde::de::DeserializeOwned>(
    resp: reqwest::blocking::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return resp.json::<T>().map_err(|e| ClientError::Decode(e.to_string()));
    }
    let status = status.as_u16();
    let body: ErrorBody = resp.json().unwrap_or_default();
    Err(ClientError::Api {
        status,
        code: body.code.unwrap_or_else(|| "UNKNOWN".into()),
        message: body.message.unwrap_or_else(|| format!("request failed with status {status}")),
    })
}

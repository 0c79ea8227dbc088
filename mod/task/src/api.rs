//! HTTP handlers for the task API.
//!
//! Routes:
//!   GET    /tasks        list all tasks
//!   POST   /tasks        create a task
//!   GET    /tasks/{id}   fetch one task
//!   PUT    /tasks/{id}   partially update a task
//!   DELETE /tasks/{id}   delete a task
//!
//! Extractor rejections (malformed JSON, unknown fields, non-integer
//! ids) are mapped to [`ServiceError::Validation`] so every error
//! response carries the same `{"code", "message"}` body.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use taskkeeper_core::ServiceError;

use crate::model::{
    CreateTaskRequest, CreateTaskResponse, MessageResponse, Task, TaskListResponse,
    UpdateTaskRequest,
};
use crate::store::TaskStore;

type StoreState = Arc<TaskStore>;

/// Build the task router. The caller picks the mount prefix.
pub fn router(store: Arc<TaskStore>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .with_state(store)
}

async fn list_tasks(
    State(store): State<StoreState>,
) -> Result<Json<TaskListResponse>, ServiceError> {
    let tasks = store.list()?;
    Ok(Json(TaskListResponse { tasks }))
}

async fn create_task(
    State(store): State<StoreState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), ServiceError> {
    let Json(req) = payload.map_err(bad_request)?;
    let id = store.create(&req)?;
    Ok((StatusCode::CREATED, Json(CreateTaskResponse { id, message: "Task created".into() })))
}

async fn get_task(
    State(store): State<StoreState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Task>, ServiceError> {
    let Path(id) = id.map_err(bad_request)?;
    Ok(Json(store.get(id)?))
}

async fn update_task(
    State(store): State<StoreState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let Path(id) = id.map_err(bad_request)?;
    let Json(patch) = payload.map_err(bad_request)?;
    store.update(id, &patch)?;
    Ok(Json(MessageResponse { message: "Task updated".into() }))
}

async fn delete_task(
    State(store): State<StoreState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let Path(id) = id.map_err(bad_request)?;
    store.delete(id)?;
    Ok(Json(MessageResponse { message: "Task deleted".into() }))
}

fn bad_request<E: std::fmt::Display>(err: E) -> ServiceError {
    ServiceError::Validation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use taskkeeper_sql::SqliteStore;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let db = Arc::new(SqliteStore::open_in_memory().unwrap());
        let store = TaskStore::new(db);
        store.migrate().unwrap();
        router(Arc::new(store))
    }

    async fn api(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let app = test_router();
        let (status, body) = api(&app, "GET", "/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "tasks": [] }));
    }

    #[tokio::test]
    async fn create_then_fetch_then_complete_then_delete() {
        let app = test_router();

        let (status, body) = api(&app, "POST", "/tasks", Some(json!({"title": "Buy milk"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Task created");
        let id = body["id"].as_i64().unwrap();
        assert_eq!(id, 1);

        let (status, body) = api(&app, "GET", &format!("/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "id": id, "title": "Buy milk", "description": "", "completed": false })
        );

        let (status, body) =
            api(&app, "PUT", &format!("/tasks/{id}"), Some(json!({"completed": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Task updated" }));

        let (_, body) = api(&app, "GET", &format!("/tasks/{id}"), None).await;
        assert_eq!(body["title"], "Buy milk");
        assert_eq!(body["completed"], true);

        let (status, body) = api(&app, "DELETE", &format!("/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Task deleted" }));

        let (status, body) = api(&app, "GET", &format!("/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn create_assigns_distinct_increasing_ids() {
        let app = test_router();
        let mut last = 0;
        for title in ["one", "two", "three"] {
            let (_, body) = api(&app, "POST", "/tasks", Some(json!({"title": title}))).await;
            let id = body["id"].as_i64().unwrap();
            assert!(id > last);
            last = id;
        }
    }

    #[tokio::test]
    async fn create_without_title_adds_no_row() {
        let app = test_router();
        let (status, body) =
            api(&app, "POST", "/tasks", Some(json!({"description": "no title"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let (_, body) = api(&app, "GET", "/tasks", None).await;
        assert_eq!(body, json!({ "tasks": [] }));
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let app = test_router();
        let (status, body) = api(&app, "POST", "/tasks", Some(json!({"title": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn title_length_limit_is_enforced() {
        let app = test_router();

        let (status, _) =
            api(&app, "POST", "/tasks", Some(json!({"title": "x".repeat(30)}))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            api(&app, "POST", "/tasks", Some(json!({"title": "x".repeat(31)}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn unknown_fields_are_rejected() {
        let app = test_router();
        let (status, body) =
            api(&app, "POST", "/tasks", Some(json!({"title": "ok", "priority": 3}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let (_, body) = api(&app, "POST", "/tasks", Some(json!({"title": "ok"}))).await;
        let id = body["id"].as_i64().unwrap();
        let (status, body) =
            api(&app, "PUT", &format!("/tasks/{id}"), Some(json!({"done": true}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = test_router();
        let request = Request::builder()
            .method("POST")
            .uri("/tasks")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn non_integer_id_is_a_validation_error() {
        let app = test_router();
        let (status, body) = api(&app, "GET", "/tasks/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn update_keeps_unmentioned_fields() {
        let app = test_router();
        let (_, body) = api(
            &app,
            "POST",
            "/tasks",
            Some(json!({"title": "Buy milk", "description": "2 liters"})),
        )
        .await;
        let id = body["id"].as_i64().unwrap();

        let (status, _) =
            api(&app, "PUT", &format!("/tasks/{id}"), Some(json!({"completed": true}))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = api(&app, "GET", &format!("/tasks/{id}"), None).await;
        assert_eq!(
            body,
            json!({ "id": id, "title": "Buy milk", "description": "2 liters", "completed": true })
        );
    }

    #[tokio::test]
    async fn empty_patch_is_accepted() {
        let app = test_router();
        let (_, body) = api(&app, "POST", "/tasks", Some(json!({"title": "Buy milk"}))).await;
        let id = body["id"].as_i64().unwrap();

        let (status, body) = api(&app, "PUT", &format!("/tasks/{id}"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Task updated");

        let (_, body) = api(&app, "GET", &format!("/tasks/{id}"), None).await;
        assert_eq!(body["title"], "Buy milk");
    }

    #[tokio::test]
    async fn update_missing_task_is_not_found() {
        let app = test_router();
        let (status, body) =
            api(&app, "PUT", "/tasks/99", Some(json!({"completed": true}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn delete_missing_task_is_not_found() {
        let app = test_router();
        let (status, body) = api(&app, "DELETE", "/tasks/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn list_tracks_creates_and_deletes() {
        let app = test_router();
        let mut ids = Vec::new();
        for i in 0..4 {
            let (_, body) =
                api(&app, "POST", "/tasks", Some(json!({"title": format!("task {i}")}))).await;
            ids.push(body["id"].as_i64().unwrap());
        }
        for id in [ids[0], ids[2]] {
            let (status, _) = api(&app, "DELETE", &format!("/tasks/{id}"), None).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = api(&app, "GET", "/tasks", None).await;
        let listed: Vec<i64> =
            body["tasks"].as_array().unwrap().iter().map(|t| t["id"].as_i64().unwrap()).collect();
        assert_eq!(listed, vec![ids[1], ids[3]]);
    }
}

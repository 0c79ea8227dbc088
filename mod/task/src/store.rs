//! Persistence for tasks on top of [`SQLStore`].

use std::sync::Arc;

use tracing::debug;

use taskkeeper_core::ServiceError;
use taskkeeper_sql::{Row, SQLStore, Value};

use crate::model::{CreateTaskRequest, Task, UpdateTaskRequest};

/// Schema migrations, applied in order. `PRAGMA user_version` records
/// the last applied entry, so re-running is a no-op.
///
/// AUTOINCREMENT keeps deleted ids out of circulation: a new task never
/// reuses the id of one that was removed.
const MIGRATIONS: &[&str] = &[
    // v1: the task table
    "CREATE TABLE IF NOT EXISTS tasks (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        description TEXT,
        completed   INTEGER NOT NULL DEFAULT 0
    );",
];

/// Task persistence over an injected [`SQLStore`] handle.
pub struct TaskStore {
    db: Arc<dyn SQLStore>,
}

impl TaskStore {
    pub fn new(db: Arc<dyn SQLStore>) -> Self {
        Self { db }
    }

    /// Apply pending schema migrations. Must complete before the
    /// service accepts traffic; safe to call repeatedly.
    pub fn migrate(&self) -> Result<(), ServiceError> {
        let current = self.schema_version()?;
        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i64;
            if version <= current {
                continue;
            }
            self.db
                .exec_batch(statements)
                .map_err(|e| ServiceError::Storage(format!("migration v{version}: {e}")))?;
            self.db
                .exec_batch(&format!("PRAGMA user_version = {version};"))
                .map_err(|e| ServiceError::Storage(format!("migration v{version}: {e}")))?;
            debug!(version, "applied schema migration");
        }
        Ok(())
    }

    /// Last applied migration version, 0 for a fresh database.
    pub fn schema_version(&self) -> Result<i64, ServiceError> {
        let rows = self
            .db
            .query("PRAGMA user_version", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|row| row.get_i64("user_version")).unwrap_or(0))
    }

    /// Insert a new task and return its assigned id.
    pub fn create(&self, req: &CreateTaskRequest) -> Result<i64, ServiceError> {
        req.validate()?;
        let description = req.description.clone().unwrap_or_default();
        let id = self
            .db
            .insert(
                "INSERT INTO tasks (title, description, completed) VALUES (?1, ?2, 0)",
                &[Value::Text(req.title.clone()), Value::Text(description)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        debug!(id, "created task");
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Task, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT id, title, description, completed FROM tasks WHERE id = ?1",
                &[Value::Integer(id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        let row = rows.first().ok_or_else(|| not_found(id))?;
        row_to_task(row)
    }

    /// All tasks, ordered by id.
    pub fn list(&self) -> Result<Vec<Task>, ServiceError> {
        let rows = self
            .db
            .query("SELECT id, title, description, completed FROM tasks ORDER BY id ASC", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        rows.iter().map(row_to_task).collect()
    }

    /// Merge `patch` into the stored task: only supplied fields change.
    pub fn update(&self, id: i64, patch: &UpdateTaskRequest) -> Result<(), ServiceError> {
        patch.validate()?;
        let current = self.get(id)?;
        let title = patch.title.clone().unwrap_or(current.title);
        let description = patch.description.clone().unwrap_or(current.description);
        let completed = patch.completed.unwrap_or(current.completed);
        let affected = self
            .db
            .exec(
                "UPDATE tasks SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
                &[
                    Value::Text(title),
                    Value::Text(description),
                    Value::Integer(completed as i64),
                    Value::Integer(id),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(not_found(id));
        }
        debug!(id, "updated task");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec("DELETE FROM tasks WHERE id = ?1", &[Value::Integer(id)])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(not_found(id));
        }
        debug!(id, "deleted task");
        Ok(())
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("task {id} not found"))
}

fn row_to_task(row: &Row) -> Result<Task, ServiceError> {
    let id = row.get_i64("id").ok_or_else(|| ServiceError::Storage("missing id column".into()))?;
    let title = row
        .get_str("title")
        .ok_or_else(|| ServiceError::Storage("missing title column".into()))?
        .to_string();
    // A NULL description reads back as the empty string.
    let description = row.get_str("description").unwrap_or_default().to_string();
    let completed = row.get_bool("completed").unwrap_or(false);
    Ok(Task { id, title, description, completed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskkeeper_sql::SqliteStore;

    fn test_store() -> TaskStore {
        let db = Arc::new(SqliteStore::open_in_memory().unwrap());
        let store = TaskStore::new(db);
        store.migrate().unwrap();
        store
    }

    fn req(title: &str, description: Option<&str>) -> CreateTaskRequest {
        CreateTaskRequest { title: title.into(), description: description.map(Into::into) }
    }

    #[test]
    fn migrate_is_idempotent() {
        let store = test_store();
        assert_eq!(store.schema_version().unwrap(), 1);
        store.migrate().unwrap();
        assert_eq!(store.schema_version().unwrap(), 1);
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let store = test_store();
        assert_eq!(store.create(&req("one", None)).unwrap(), 1);
        assert_eq!(store.create(&req("two", None)).unwrap(), 2);
    }

    #[test]
    fn create_rejects_blank_title() {
        let store = test_store();
        let err = store.create(&req("  ", None)).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn get_returns_stored_fields() {
        let store = test_store();
        let id = store.create(&req("Buy milk", Some("2 liters"))).unwrap();
        let task = store.get(id).unwrap();
        assert_eq!(
            task,
            Task {
                id,
                title: "Buy milk".into(),
                description: "2 liters".into(),
                completed: false
            }
        );
    }

    #[test]
    fn missing_description_reads_back_empty() {
        let store = test_store();
        let id = store.create(&req("Buy milk", None)).unwrap();
        assert_eq!(store.get(id).unwrap().description, "");
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = test_store();
        assert!(matches!(store.get(42), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let store = test_store();
        let id = store.create(&req("Buy milk", Some("2 liters"))).unwrap();

        let patch = UpdateTaskRequest { completed: Some(true), ..Default::default() };
        store.update(id, &patch).unwrap();

        let task = store.get(id).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2 liters");
        assert!(task.completed);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let store = test_store();
        let id = store.create(&req("Buy milk", None)).unwrap();
        store.update(id, &UpdateTaskRequest::default()).unwrap();
        assert_eq!(store.get(id).unwrap().title, "Buy milk");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = test_store();
        let patch = UpdateTaskRequest { completed: Some(true), ..Default::default() };
        assert!(matches!(store.update(7, &patch), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn update_rejects_blank_title() {
        let store = test_store();
        let id = store.create(&req("Buy milk", None)).unwrap();
        let patch = UpdateTaskRequest { title: Some("".into()), ..Default::default() };
        assert!(matches!(store.update(id, &patch), Err(ServiceError::Validation(_))));
        assert_eq!(store.get(id).unwrap().title, "Buy milk");
    }

    #[test]
    fn delete_removes_the_task() {
        let store = test_store();
        let id = store.create(&req("Buy milk", None)).unwrap();
        store.delete(id).unwrap();
        assert!(matches!(store.get(id), Err(ServiceError::NotFound(_))));
        assert!(matches!(store.delete(id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn deleted_ids_are_never_reused() {
        let store = test_store();
        store.create(&req("one", None)).unwrap();
        let second = store.create(&req("two", None)).unwrap();
        store.delete(second).unwrap();
        let third = store.create(&req("three", None)).unwrap();
        assert!(third > second);
    }

    #[test]
    fn list_is_ordered_by_id() {
        let store = test_store();
        for title in ["one", "two", "three"] {
            store.create(&req(title, None)).unwrap();
        }
        let ids: Vec<i64> = store.list().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn list_reflects_creates_and_deletes() {
        let store = test_store();
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(store.create(&req(&format!("task {i}"), None)).unwrap());
        }
        store.delete(ids[0]).unwrap();
        store.delete(ids[2]).unwrap();
        let remaining: Vec<i64> = store.list().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(remaining, vec![ids[1], ids[3]]);
    }
}

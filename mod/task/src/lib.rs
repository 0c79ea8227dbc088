//! Task tracking module: a task table with list/create/get/update/delete
//! exposed over JSON HTTP.

pub mod api;
pub mod model;
pub mod store;

use std::sync::Arc;

use axum::Router;

use taskkeeper_core::{Module, ServiceError};
use taskkeeper_sql::SQLStore;

pub use model::{CreateTaskRequest, Task, UpdateTaskRequest};
pub use store::TaskStore;

pub struct TaskModule {
    store: Arc<TaskStore>,
}

impl TaskModule {
    /// Wire the module to a database handle. Run [`TaskModule::migrate`]
    /// before serving traffic.
    pub fn new(db: Arc<dyn SQLStore>) -> Self {
        Self { store: Arc::new(TaskStore::new(db)) }
    }

    /// Apply pending schema migrations.
    pub fn migrate(&self) -> Result<(), ServiceError> {
        self.store.migrate()
    }

    pub fn store(&self) -> Arc<TaskStore> {
        Arc::clone(&self.store)
    }
}

impl Module for TaskModule {
    fn name(&self) -> &str {
        "task"
    }

    fn routes(&self) -> Router {
        api::router(Arc::clone(&self.store))
    }
}

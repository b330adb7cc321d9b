//! Task board provider trait.

use crate::types::task_board::{KnownPlan, NewTask, TaskDetailsUpdate};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for an external task tracking service (Microsoft Planner, etc.)
/// that organizes tasks into plans.
///
/// None of these calls are idempotent: repeating `create_plan` or
/// `create_task` creates duplicates. Callers must not retry blindly.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Create a plan and return its task board id.
    async fn create_plan(&self, title: &str) -> Result<String, Error>;

    /// Create a task and return its task board id.
    async fn create_task(&self, task: &NewTask) -> Result<String, Error>;

    /// Attach a description and checklist to a created task.
    async fn update_task_details(
        &self,
        task_id: &str,
        details: &TaskDetailsUpdate,
    ) -> Result<(), Error>;

    /// List the plans tasks may be associated with.
    async fn list_plans(&self) -> Result<Vec<KnownPlan>, Error>;

    /// Return unique identifier for this provider (e.g., "microsoft_planner").
    fn provider_id(&self) -> &str;
}

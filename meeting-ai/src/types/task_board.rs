//! Types exchanged with task board and directory providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::priority::TaskPriority;

/// A plan that already exists on the task board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownPlan {
    pub id: String,
    pub title: String,
}

/// A task to create inside an existing plan.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub plan_id: String,
    pub title: String,
    /// Task board user ids of the assignees.
    pub assignee_ids: Vec<String>,
    pub priority: TaskPriority,
    pub start_date_time: Option<DateTime<Utc>>,
    pub due_date_time: Option<DateTime<Utc>>,
}

/// One checklist entry keyed by a synthetic id unique within its task.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistEntry {
    pub id: String,
    pub title: String,
    pub is_checked: bool,
}

/// Description and checklist attached to a created task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDetailsUpdate {
    pub description: String,
    pub checklist: Vec<ChecklistEntry>,
}

/// A user known to the task board's directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

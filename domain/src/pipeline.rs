//! Save and upload flows over an extraction result.
//!
//! Save persists first and syncs second. A sync failure is reported in the
//! summary but never undoes or hides the stored meeting.

use crate::error::Error;
use crate::projection::{self, Projection};
use crate::sync::{self, FailurePolicy, GroupOutcome, SyncOutcome};
use entity_api::{task, Id};
use log::*;
use meeting_ai::traits::directory::Provider as Directory;
use meeting_ai::traits::task_board::Provider as TaskBoard;
use meeting_ai::MeetingExtractionResult;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

const TASK_BOARD_NOT_CONFIGURED: &str = "task board is not configured";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncStatus::Success => write!(f, "success"),
            SyncStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a save: the meeting is always stored, the sync may have failed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SaveSummary {
    #[schema(value_type = String, format = Uuid)]
    pub meeting_id: Id,
    pub task_count: usize,
    pub sync_status: SyncStatus,
    pub sync_error: Option<String>,
    pub message: String,
}

/// Persists `result`, then syncs it to the task board.
///
/// Returns an error only when persistence fails, in which case no sync is
/// attempted. Sync failures are isolated per group and reported through
/// `sync_status` and `sync_error`.
pub async fn handle_save(
    db: &DatabaseConnection,
    task_board: Option<&dyn TaskBoard>,
    directory: Option<&dyn Directory>,
    result: &MeetingExtractionResult,
    host_id: Option<Id>,
) -> Result<SaveSummary, Error> {
    let projection = projection::project(db, result, host_id).await?;
    let task_count = projection.task_count();

    let sync_error = match task_board {
        Some(task_board) => {
            match sync::sync(task_board, directory, result, FailurePolicy::Isolate).await {
                Ok(outcome) => {
                    reconcile(db, &projection, &outcome).await;
                    outcome.error_message()
                }
                Err(err) => Some(err.to_string()),
            }
        }
        None => {
            warn!(
                "Skipping sync of meeting {}: {TASK_BOARD_NOT_CONFIGURED}",
                projection.meeting_id
            );
            Some(TASK_BOARD_NOT_CONFIGURED.to_string())
        }
    };

    let summary = match sync_error {
        None => SaveSummary {
            meeting_id: projection.meeting_id,
            task_count,
            sync_status: SyncStatus::Success,
            sync_error: None,
            message: format!(
                "Meeting and {task_count} tasks saved successfully and synced to the task board"
            ),
        },
        Some(error) => {
            warn!(
                "Meeting {} saved but sync failed: {error}",
                projection.meeting_id
            );
            SaveSummary {
                meeting_id: projection.meeting_id,
                task_count,
                sync_status: SyncStatus::Failed,
                message: format!(
                    "Meeting and {task_count} tasks saved successfully. Planner sync failed: {error}"
                ),
                sync_error: Some(error),
            }
        }
    };

    Ok(summary)
}

/// Syncs `result` to the task board without touching the database. The first
/// failure aborts the upload and is returned.
pub async fn upload_only(
    task_board: Option<&dyn TaskBoard>,
    directory: Option<&dyn Directory>,
    result: &MeetingExtractionResult,
) -> Result<(), Error> {
    let task_board = task_board.ok_or_else(|| {
        error!("Upload requested but {TASK_BOARD_NOT_CONFIGURED}");
        Error::config(TASK_BOARD_NOT_CONFIGURED)
    })?;

    let outcome = sync::sync(task_board, directory, result, FailurePolicy::Abort).await?;
    info!("Uploaded {} task groups", outcome.groups.len());

    Ok(())
}

/// Stores the task board ids of every synced task on its row. Failures are
/// logged and skipped.
async fn reconcile(db: &DatabaseConnection, projection: &Projection, outcome: &SyncOutcome) {
    for (row_ids, group) in projection.task_ids.iter().zip(&outcome.groups) {
        let GroupOutcome::Synced { plan_id, task_ids } = group else {
            continue;
        };

        for (row_id, remote_id) in row_ids.iter().zip(task_ids) {
            if let Err(err) =
                task::update_planner_ids(db, *row_id, remote_id.clone(), plan_id.clone()).await
            {
                warn!("Failed to record task board ids on task {row_id}: {err}");
            }
        }
    }
}


#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::test_support::{group, result_with, task, MockTaskBoard};
    use chrono::Utc;
    use entity_api::meeting_status::MeetingStatus;
    use entity_api::task_status::TaskStatus;
    use entity_api::{goals, meetings, tasks};
    use meeting_ai::{Error as MeetingAiError, PlanAssociation};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use serde_json::json;

    fn meeting_model() -> meetings::Model {
        let now = Utc::now();
        meetings::Model {
            id: Id::new_v4(),
            title: "Weekly sync".to_string(),
            date: None,
            summary: None,
            transcript_path: None,
            host_id: None,
            status: MeetingStatus::Completed,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn goal_model() -> goals::Model {
        let now = Utc::now();
        goals::Model {
            id: Id::new_v4(),
            title: "Hiring".to_string(),
            description: None,
            year: 2024,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn task_model(meeting_id: Id) -> tasks::Model {
        let now = Utc::now();
        tasks::Model {
            id: Id::new_v4(),
            meeting_id,
            goal_id: None,
            title: "Post job".to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: "important".to_string(),
            due_date: None,
            assignee_id: None,
            department_id: None,
            planner_task_id: None,
            planner_plan_id: None,
            metadata: json!({}),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn single_task_result() -> MeetingExtractionResult {
        result_with(
            vec![group(PlanAssociation::new_plan("Hiring"), vec![task("Post job")])],
            Some("2024-06-15T14:30:00Z"),
        )
    }

    #[tokio::test]
    async fn persistence_failure_skips_sync() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom("insert rejected".to_string())])
            .into_connection();

        let mut task_board = MockTaskBoard::new();
        task_board.expect_create_plan().never();
        task_board.expect_create_task().never();
        task_board.expect_update_task_details().never();

        let result = handle_save(&db, Some(&task_board), None, &single_task_result(), None).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn sync_failure_still_reports_the_saved_meeting() -> Result<(), Error> {
        let meeting = meeting_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![meeting.clone()]])
            .append_query_results(vec![vec![goal_model()]])
            .append_query_results(vec![vec![task_model(meeting.id)]])
            .into_connection();

        let mut task_board = MockTaskBoard::new();
        task_board
            .expect_provider_id()
            .return_const("mock".to_string());
        task_board
            .expect_create_plan()
            .returning(|_| Err(MeetingAiError::Provider("Graph returned 503".to_string())));
        task_board.expect_create_task().never();

        let summary =
            handle_save(&db, Some(&task_board), None, &single_task_result(), None).await?;

        assert_eq!(summary.meeting_id, meeting.id);
        assert_eq!(summary.task_count, 1);
        assert_eq!(summary.sync_status, SyncStatus::Failed);
        assert!(summary.sync_error.unwrap().contains("Graph returned 503"));
        assert!(summary.message.contains("saved successfully"));
        assert!(summary.message.contains("Planner sync failed"));
        Ok(())
    }

    #[tokio::test]
    async fn successful_sync_records_task_board_ids() -> Result<(), Error> {
        let meeting = meeting_model();
        let row = task_model(meeting.id);
        let synced = tasks::Model {
            planner_task_id: Some("task-1".to_string()),
            planner_plan_id: Some("plan-1".to_string()),
            ..row.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![meeting.clone()]])
            .append_query_results(vec![vec![goal_model()]])
            .append_query_results(vec![vec![row.clone()], vec![row.clone()], vec![synced]])
            .into_connection();

        let mut task_board = MockTaskBoard::new();
        task_board
            .expect_provider_id()
            .return_const("mock".to_string());
        task_board
            .expect_create_plan()
            .returning(|_| Ok("plan-1".to_string()));
        task_board
            .expect_create_task()
            .times(1)
            .returning(|_| Ok("task-1".to_string()));
        task_board
            .expect_update_task_details()
            .returning(|_, _| Ok(()));

        let summary =
            handle_save(&db, Some(&task_board), None, &single_task_result(), None).await?;

        assert_eq!(summary.sync_status, SyncStatus::Success);
        assert_eq!(summary.sync_error, None);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("task-1"));
        Ok(())
    }

    #[tokio::test]
    async fn reconciliation_failures_do_not_fail_the_save() -> Result<(), Error> {
        let meeting = meeting_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![meeting.clone()]])
            .append_query_results(vec![vec![goal_model()]])
            .append_query_results(vec![vec![task_model(meeting.id)]])
            .append_query_errors(vec![DbErr::Custom("connection lost".to_string())])
            .into_connection();

        let mut task_board = MockTaskBoard::new();
        task_board
            .expect_provider_id()
            .return_const("mock".to_string());
        task_board
            .expect_create_plan()
            .returning(|_| Ok("plan-1".to_string()));
        task_board
            .expect_create_task()
            .returning(|_| Ok("task-1".to_string()));
        task_board
            .expect_update_task_details()
            .returning(|_, _| Ok(()));

        let summary =
            handle_save(&db, Some(&task_board), None, &single_task_result(), None).await?;

        assert_eq!(summary.sync_status, SyncStatus::Success);
        Ok(())
    }

    #[tokio::test]
    async fn missing_task_board_reports_a_failed_sync() -> Result<(), Error> {
        let meeting = meeting_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![meeting.clone()]])
            .append_query_results(vec![vec![goal_model()]])
            .append_query_results(vec![vec![task_model(meeting.id)]])
            .into_connection();

        let summary = handle_save(&db, None, None, &single_task_result(), None).await?;

        assert_eq!(summary.meeting_id, meeting.id);
        assert_eq!(summary.sync_status, SyncStatus::Failed);
        assert_eq!(summary.sync_error.as_deref(), Some(TASK_BOARD_NOT_CONFIGURED));
        Ok(())
    }
}

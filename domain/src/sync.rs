//! Pushes a persisted extraction result to the task board.
//!
//! Groups are synced one after another in document order and tasks inside a
//! group in task order. Nothing here is idempotent: syncing the same result
//! twice creates its plans and tasks twice.

use crate::checklist;
use crate::error::Error;
use crate::plan_resolver;
use email_address::EmailAddress;
use log::*;
use meeting_ai::traits::directory::Provider as Directory;
use meeting_ai::traits::task_board::Provider as TaskBoard;
use meeting_ai::types::task_board::{NewTask, TaskDetailsUpdate};
use meeting_ai::{MeetingExtractionResult, TaskAssignment, TaskGroup, TranscriptionTask};

/// What happens to the remaining groups when one group fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and carry on with the next group.
    Isolate,
    /// Stop and return the first failure.
    Abort,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    Synced {
        plan_id: String,
        /// Task board ids of the group's tasks, in task order.
        task_ids: Vec<String>,
    },
    Failed {
        reason: String,
    },
}

/// Per group results of one sync run, in group order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOutcome {
    pub groups: Vec<GroupOutcome>,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        self.groups
            .iter()
            .all(|group| matches!(group, GroupOutcome::Synced { .. }))
    }

    /// Failure reasons joined into one message, or `None` when every group synced.
    pub fn error_message(&self) -> Option<String> {
        let reasons: Vec<&str> = self
            .groups
            .iter()
            .filter_map(|group| match group {
                GroupOutcome::Failed { reason } => Some(reason.as_str()),
                GroupOutcome::Synced { .. } => None,
            })
            .collect();

        if reasons.is_empty() {
            None
        } else {
            Some(reasons.join("; "))
        }
    }
}

pub async fn sync(
    task_board: &dyn TaskBoard,
    directory: Option<&dyn Directory>,
    result: &MeetingExtractionResult,
    policy: FailurePolicy,
) -> Result<SyncOutcome, Error> {
    debug!(
        "Syncing {} task groups to {} ({policy:?})",
        result.task_groups().len(),
        task_board.provider_id()
    );

    let mut outcome = SyncOutcome::default();

    for group in result.task_groups() {
        match sync_group(task_board, directory, group).await {
            Ok((plan_id, task_ids)) => {
                info!(
                    "Synced {} tasks to plan {plan_id} ('{}')",
                    task_ids.len(),
                    group.plan_association().plan_title()
                );
                outcome
                    .groups
                    .push(GroupOutcome::Synced { plan_id, task_ids });
            }
            Err(err) => match policy {
                FailurePolicy::Abort => {
                    error!(
                        "Sync of plan '{}' failed: {err}",
                        group.plan_association().plan_title()
                    );
                    return Err(err);
                }
                FailurePolicy::Isolate => {
                    warn!(
                        "Sync of plan '{}' failed, continuing with the next group: {err}",
                        group.plan_association().plan_title()
                    );
                    outcome.groups.push(GroupOutcome::Failed {
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    Ok(outcome)
}

async fn sync_group(
    task_board: &dyn TaskBoard,
    directory: Option<&dyn Directory>,
    group: &TaskGroup,
) -> Result<(String, Vec<String>), Error> {
    let plan_id = plan_resolver::resolve(task_board, group.plan_association()).await?;

    let mut task_ids = Vec::with_capacity(group.tasks().len());
    for task in group.tasks() {
        task_ids.push(sync_task(task_board, directory, &plan_id, task).await?);
    }

    Ok((plan_id, task_ids))
}

async fn sync_task(
    task_board: &dyn TaskBoard,
    directory: Option<&dyn Directory>,
    plan_id: &str,
    task: &TranscriptionTask,
) -> Result<String, Error> {
    let new_task = NewTask {
        plan_id: plan_id.to_string(),
        title: task.title().to_string(),
        assignee_ids: resolve_assignees(directory, task.assignments()).await,
        priority: task.priority(),
        start_date_time: task.start_date_time_utc(),
        due_date_time: task.due_date_utc(),
    };

    let task_id = task_board.create_task(&new_task).await?;
    debug!("Created task {task_id} '{}'", task.title());

    let details = TaskDetailsUpdate {
        description: task.details().description.clone(),
        checklist: checklist::format(&task.details().checklist_items),
    };
    task_board.update_task_details(&task_id, &details).await?;

    Ok(task_id)
}

/// Looks up task board user ids for the assignees that carry a valid email.
/// Assignees that cannot be resolved stay unassigned.
async fn resolve_assignees(
    directory: Option<&dyn Directory>,
    assignments: &[TaskAssignment],
) -> Vec<String> {
    let Some(directory) = directory else {
        return Vec::new();
    };

    let mut user_ids = Vec::new();
    for assignment in assignments {
        let Some(email) = assignment.assignee_email.as_deref().map(str::trim) else {
            debug!("No email for assignee '{}'", assignment.assignee_name);
            continue;
        };

        if !EmailAddress::is_valid(email) {
            warn!(
                "Skipping assignee '{}' with invalid email '{email}'",
                assignment.assignee_name
            );
            continue;
        }

        match directory.find_user_by_email(email).await {
            Ok(Some(user)) => user_ids.push(user.id),
            Ok(None) => warn!("No directory user found for {email}"),
            Err(err) => warn!("Directory lookup for {email} failed: {err}"),
        }
    }

    user_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};
    use crate::test_support::{group, result_with, task, MockDirectory, MockTaskBoard};
    use meeting_ai::types::task_board::DirectoryUser;
    use meeting_ai::{
        AssociationType, CheckListItem, Error as MeetingAiError, PlanAssociation, TaskDetails,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn two_group_result() -> MeetingExtractionResult {
        result_with(
            vec![
                group(PlanAssociation::new_plan("Hiring"), vec![task("Post job")]),
                group(
                    PlanAssociation::new_plan("Website"),
                    vec![task("Draft wireframes")],
                ),
            ],
            None,
        )
    }

    #[tokio::test]
    async fn isolate_records_a_failed_group_and_continues() {
        let mut task_board = MockTaskBoard::new();
        task_board
            .expect_provider_id()
            .return_const("mock".to_string());
        task_board.expect_create_plan().returning(|title| {
            if title == "Hiring" {
                Err(MeetingAiError::Provider("plan quota reached".to_string()))
            } else {
                Ok("plan-web".to_string())
            }
        });
        task_board
            .expect_create_task()
            .times(1)
            .returning(|_| Ok("task-1".to_string()));
        task_board
            .expect_update_task_details()
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = sync(&task_board, None, &two_group_result(), FailurePolicy::Isolate)
            .await
            .unwrap();

        assert!(!outcome.is_success());
        assert!(matches!(outcome.groups[0], GroupOutcome::Failed { .. }));
        assert_eq!(
            outcome.groups[1],
            GroupOutcome::Synced {
                plan_id: "plan-web".to_string(),
                task_ids: vec!["task-1".to_string()],
            }
        );
        assert!(outcome
            .error_message()
            .unwrap()
            .contains("plan quota reached"));
    }

    #[tokio::test]
    async fn abort_stops_at_the_first_failed_group() {
        let mut task_board = MockTaskBoard::new();
        task_board
            .expect_provider_id()
            .return_const("mock".to_string());
        task_board
            .expect_create_plan()
            .times(1)
            .returning(|_| Err(MeetingAiError::Network("connection reset".to_string())));
        task_board.expect_create_task().never();

        let result = sync(&task_board, None, &two_group_result(), FailurePolicy::Abort).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn unchecked_existing_association_creates_no_tasks() {
        let mut task_board = MockTaskBoard::new();
        task_board
            .expect_provider_id()
            .return_const("mock".to_string());
        task_board.expect_create_plan().never();
        task_board.expect_create_task().never();

        let association =
            PlanAssociation::new_unchecked(AssociationType::Existing, "Website", None, None);
        let result = result_with(vec![group(association, vec![task("Draft wireframes")])], None);

        let err = sync(&task_board, None, &result, FailurePolicy::Abort)
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::InvalidAssociation(_))
        ));
    }

    #[tokio::test]
    async fn tasks_are_created_with_details_and_checklist() {
        let details_calls = Arc::new(AtomicUsize::new(0));
        let details_calls_seen = Arc::clone(&details_calls);

        let mut task_board = MockTaskBoard::new();
        task_board
            .expect_provider_id()
            .return_const("mock".to_string());
        task_board
            .expect_create_plan()
            .returning(|_| Ok("plan-1".to_string()));
        task_board
            .expect_create_task()
            .withf(|new_task| {
                new_task.plan_id == "plan-1"
                    && new_task.title == "Audit documents"
                    && new_task.priority.to_external() == 3
            })
            .returning(|_| Ok("task-9".to_string()));
        task_board
            .expect_update_task_details()
            .withf(|task_id, details| {
                task_id.to_string() == "task-9"
                    && details.description == "Review every contract"
                    && details.checklist.len() == 2
                    && details.checklist.iter().all(|entry| !entry.is_checked)
            })
            .returning(move |_, _| {
                details_calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });

        let audit = TranscriptionTask::new(
            "Audit documents",
            TaskDetails {
                description: "Review every contract".to_string(),
                checklist_items: vec![
                    CheckListItem {
                        title: "Identify documents".to_string(),
                    },
                    CheckListItem {
                        title: "Log locations".to_string(),
                    },
                ],
            },
        )
        .with_priority(meeting_ai::TaskPriority::Important);
        let result = result_with(
            vec![group(PlanAssociation::new_plan("Legal"), vec![audit])],
            None,
        );

        let outcome = sync(&task_board, None, &result, FailurePolicy::Abort)
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(details_calls_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn assignees_resolve_through_the_directory() {
        let mut directory = MockDirectory::new();
        directory
            .expect_find_user_by_email()
            .times(2)
            .returning(|email| {
                if email == "dana@example.com" {
                    Ok(Some(DirectoryUser {
                        id: "user-dana".to_string(),
                        email: Some(email.to_string()),
                        display_name: Some("Dana".to_string()),
                    }))
                } else {
                    Err(MeetingAiError::NotFound(email.to_string()))
                }
            });

        let assignments = vec![
            TaskAssignment::new("Dana", Some("dana@example.com".to_string())),
            TaskAssignment::new("Lee", Some("lee@example.com".to_string())),
            TaskAssignment::new("Sam", Some("not an email".to_string())),
            TaskAssignment::new("Kim", None),
        ];

        let user_ids = resolve_assignees(Some(&directory), &assignments).await;

        assert_eq!(user_ids, vec!["user-dana".to_string()]);
    }

    #[tokio::test]
    async fn without_a_directory_tasks_are_unassigned() {
        let assignments = vec![TaskAssignment::new(
            "Dana",
            Some("dana@example.com".to_string()),
        )];

        assert!(resolve_assignees(None, &assignments).await.is_empty());
    }
}

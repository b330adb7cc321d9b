//! Writes an extraction result into the relational store as one meeting row,
//! one goal row per task group and one task row per task.

use crate::error::Error;
use chrono::{DateTime, Datelike, Utc};
use entity_api::task_status::TaskStatus;
use entity_api::{goal, meeting, task, tasks, Id};
use log::*;
use meeting_ai::types::timestamp::parse_iso8601;
use meeting_ai::{MeetingExtractionResult, TranscriptionTask};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde_json::json;

pub const UNTITLED_MEETING: &str = "Untitled Meeting";

/// Row ids written by [`project`].
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub meeting_id: Id,
    /// One goal per task group, in group order.
    pub goal_ids: Vec<Id>,
    /// Task row ids per task group, in group and task order.
    pub task_ids: Vec<Vec<Id>>,
}

impl Projection {
    pub fn task_count(&self) -> usize {
        self.task_ids.iter().map(Vec::len).sum()
    }
}

/// Persists `result` inside a single transaction. Any failed insert rolls back
/// everything written before it.
pub async fn project(
    db: &DatabaseConnection,
    result: &MeetingExtractionResult,
    host_id: Option<Id>,
) -> Result<Projection, Error> {
    let year = goal_year(result, Utc::now());
    let title = meeting_title(result);

    debug!(
        "Projecting meeting '{title}' with {} task groups",
        result.task_groups().len()
    );

    let txn = db.begin().await?;

    let meeting = meeting::create(
        &txn,
        title.clone(),
        meeting_row_date(result),
        result.meeting_summary().map(str::to_string),
        host_id,
    )
    .await
    .map_err(|err| {
        error!("Failed to insert meeting '{title}': {err}");
        Error::write(format!("meeting '{title}'"), err)
    })?;

    let mut goal_ids = Vec::with_capacity(result.task_groups().len());
    let mut task_ids = Vec::with_capacity(result.task_groups().len());

    for group in result.task_groups() {
        let plan_title = group.plan_association().plan_title();

        let goal = goal::create(
            &txn,
            plan_title.to_string(),
            group.group_description().map(str::to_string),
            year,
        )
        .await
        .map_err(|err| {
            error!("Failed to insert goal '{plan_title}': {err}");
            Error::write(format!("goal '{plan_title}'"), err)
        })?;

        let mut group_task_ids = Vec::with_capacity(group.tasks().len());
        for transcription_task in group.tasks() {
            let row = task_row(meeting.id, goal.id, plan_title, transcription_task);
            let created = task::create(&txn, row).await.map_err(|err| {
                error!(
                    "Failed to insert task '{}': {err}",
                    transcription_task.title()
                );
                Error::write(format!("task '{}'", transcription_task.title()), err)
            })?;
            group_task_ids.push(created.id);
        }

        goal_ids.push(goal.id);
        task_ids.push(group_task_ids);
    }

    txn.commit().await?;

    let projection = Projection {
        meeting_id: meeting.id,
        goal_ids,
        task_ids,
    };
    info!(
        "Saved meeting {} with {} tasks",
        projection.meeting_id,
        projection.task_count()
    );

    Ok(projection)
}

/// Goal year shared by every goal of one result: the calendar year of the
/// overall meeting date as written, or the current UTC year when there is none.
pub fn goal_year(result: &MeetingExtractionResult, now: DateTime<Utc>) -> i32 {
    result
        .meeting_date_local()
        .map(|date| date.year())
        .unwrap_or_else(|| now.year())
}

fn meeting_title(result: &MeetingExtractionResult) -> String {
    result
        .meeting_details()
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(UNTITLED_MEETING)
        .to_string()
}

fn meeting_row_date(result: &MeetingExtractionResult) -> Option<DateTimeWithTimeZone> {
    result
        .meeting_details()
        .date
        .as_deref()
        .and_then(parse_iso8601)
        .or_else(|| result.meeting_date_utc())
        .map(DateTimeWithTimeZone::from)
}

fn task_row(
    meeting_id: Id,
    goal_id: Id,
    plan_title: &str,
    transcription_task: &TranscriptionTask,
) -> tasks::Model {
    let now = Utc::now();
    let assignee_names: Vec<&str> = transcription_task
        .assignments()
        .iter()
        .map(|assignment| assignment.assignee_name.as_str())
        .collect();
    let checklist_items = &transcription_task.details().checklist_items;

    tasks::Model {
        id: Id::nil(),
        meeting_id,
        goal_id: Some(goal_id),
        title: transcription_task.title().to_string(),
        description: Some(transcription_task.details().description.clone()),
        status: TaskStatus::Todo,
        priority: transcription_task.priority().to_internal_label().to_string(),
        due_date: transcription_task
            .due_date_utc()
            .map(DateTimeWithTimeZone::from),
        assignee_id: None,
        department_id: None,
        planner_task_id: None,
        planner_plan_id: None,
        metadata: json!({
            "plan_title": plan_title,
            "assignee_names": assignee_names,
            "checklist_items": checklist_items,
        }),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{group, result_with, task};
    use chrono::TimeZone;
    use meeting_ai::{PlanAssociation, TaskAssignment};

    #[test]
    fn goal_year_comes_from_the_meeting_date() {
        let result = result_with(
            vec![group(PlanAssociation::new_plan("Hiring"), vec![task("Post job")])],
            Some("2024-06-15T14:30:00Z"),
        );
        let now = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(goal_year(&result, now), 2024);
    }

    #[test]
    fn goal_year_keeps_the_local_calendar_year() {
        let result = result_with(
            vec![group(PlanAssociation::new_plan("Hiring"), vec![task("Post job")])],
            Some("2024-12-31T23:00:00-05:00"),
        );
        let now = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(goal_year(&result, now), 2024);
    }

    #[test]
    fn goal_year_falls_back_to_the_current_year() {
        let result = result_with(
            vec![group(PlanAssociation::new_plan("Hiring"), vec![task("Post job")])],
            None,
        );
        let now = Utc.with_ymd_and_hms(2031, 3, 9, 0, 0, 0).unwrap();

        assert_eq!(goal_year(&result, now), 2031);
    }

    #[test]
    fn blank_titles_fall_back_to_untitled() {
        let result = MeetingExtractionResult::new(
            meeting_ai::MeetingDetails {
                title: Some("  ".to_string()),
                date: None,
            },
            vec![],
            None,
            None,
        )
        .unwrap();

        assert_eq!(meeting_title(&result), UNTITLED_MEETING);
    }

    #[test]
    fn task_rows_carry_label_status_and_metadata() {
        let transcription_task = task("Draft wireframes")
            .with_assignments(vec![TaskAssignment::new(" Dana ", None)]);
        let meeting_id = Id::new_v4();
        let goal_id = Id::new_v4();

        let row = task_row(meeting_id, goal_id, "Website Redesign", &transcription_task);

        assert_eq!(row.status, TaskStatus::Todo);
        assert_eq!(row.priority, "important");
        assert_eq!(row.goal_id, Some(goal_id));
        assert_eq!(row.planner_task_id, None);
        assert_eq!(row.metadata["plan_title"], "Website Redesign");
        assert_eq!(row.metadata["assignee_names"], json!(["Dana"]));
        assert_eq!(row.metadata["checklist_items"], json!([]));
    }

    #[test]
    fn task_metadata_keeps_checklist_items_as_objects() {
        let transcription_task = TranscriptionTask::new(
            "Draft wireframes",
            meeting_ai::TaskDetails {
                description: "Landing page first".to_string(),
                checklist_items: vec![
                    meeting_ai::CheckListItem {
                        title: "Header".to_string(),
                    },
                    meeting_ai::CheckListItem {
                        title: "Footer".to_string(),
                    },
                ],
            },
        );

        let row = task_row(Id::new_v4(), Id::new_v4(), "Website Redesign", &transcription_task);

        assert_eq!(
            row.metadata["checklist_items"],
            json!([{"title": "Header"}, {"title": "Footer"}])
        );
    }
}

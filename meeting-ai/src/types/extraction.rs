//! The extraction result model: a meeting's action items grouped by the task
//! board plan they belong to.
//!
//! Every validated type here is built through a checking constructor, and serde
//! deserialization goes through the same constructors, so an instance that
//! violates an invariant cannot be obtained from untrusted JSON. Instances are
//! immutable once built.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use utoipa::ToSchema;

use super::priority::TaskPriority;
use super::timestamp::{parse_iso8601, parse_iso8601_local};
use crate::Error;

/// Caller-supplied metadata about the meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MeetingDetails {
    #[serde(rename = "meeting_title", alias = "title", default)]
    pub title: Option<String>,
    /// ISO-8601 date or date-time of the meeting.
    #[serde(rename = "meeting_date", alias = "date", default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckListItem {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskDetails {
    pub description: String,
    #[serde(default)]
    pub checklist_items: Vec<CheckListItem>,
}

/// A person a task was given to. The name is a label only; no identity is
/// resolved from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskAssignment {
    #[serde(deserialize_with = "deserialize_trimmed")]
    pub assignee_name: String,
    #[serde(default)]
    pub assignee_email: Option<String>,
}

impl TaskAssignment {
    pub fn new(assignee_name: &str, assignee_email: Option<String>) -> Self {
        Self {
            assignee_name: assignee_name.trim().to_string(),
            assignee_email,
        }
    }
}

fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

fn validate_iso8601(field: &str, value: Option<String>) -> Result<Option<String>, Error> {
    match value {
        Some(v) if parse_iso8601(&v).is_none() => Err(Error::Validation(format!(
            "{field} must be in ISO 8601 format: {v}"
        ))),
        other => Ok(other),
    }
}

/// A single action item extracted from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawTranscriptionTask")]
pub struct TranscriptionTask {
    title: String,
    details: TaskDetails,
    assignments: Vec<TaskAssignment>,
    due_date: Option<String>,
    #[serde(rename = "startDateTime")]
    start_date_time: Option<String>,
    /// Numeric task board priority: 1 urgent, 3 important, 5 medium, 9 low.
    #[schema(value_type = String, example = "5")]
    priority: TaskPriority,
}

impl TranscriptionTask {
    /// A task with no assignments, no dates and medium priority.
    pub fn new(title: impl Into<String>, details: TaskDetails) -> Self {
        Self {
            title: title.into(),
            details,
            assignments: Vec::new(),
            due_date: None,
            start_date_time: None,
            priority: TaskPriority::default(),
        }
    }

    pub fn with_assignments(mut self, assignments: Vec<TaskAssignment>) -> Self {
        self.assignments = assignments;
        self
    }

    pub fn with_due_date(mut self, due_date: Option<String>) -> Result<Self, Error> {
        self.due_date = validate_iso8601("due_date", due_date)?;
        Ok(self)
    }

    pub fn with_start_date_time(mut self, start_date_time: Option<String>) -> Result<Self, Error> {
        self.start_date_time = validate_iso8601("startDateTime", start_date_time)?;
        Ok(self)
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn details(&self) -> &TaskDetails {
        &self.details
    }

    pub fn assignments(&self) -> &[TaskAssignment] {
        &self.assignments
    }

    pub fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    pub fn start_date_time(&self) -> Option<&str> {
        self.start_date_time.as_deref()
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn due_date_utc(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(parse_iso8601)
    }

    pub fn start_date_time_utc(&self) -> Option<DateTime<Utc>> {
        self.start_date_time.as_deref().and_then(parse_iso8601)
    }
}

#[derive(Deserialize)]
struct RawTranscriptionTask {
    title: String,
    details: TaskDetails,
    #[serde(default)]
    assignments: Vec<TaskAssignment>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(rename = "startDateTime", alias = "start_date_time", default)]
    start_date_time: Option<String>,
    #[serde(default)]
    priority: TaskPriority,
}

impl TryFrom<RawTranscriptionTask> for TranscriptionTask {
    type Error = Error;

    fn try_from(raw: RawTranscriptionTask) -> Result<Self, Self::Error> {
        TranscriptionTask::new(raw.title, raw.details)
            .with_assignments(raw.assignments)
            .with_priority(raw.priority)
            .with_due_date(raw.due_date)?
            .with_start_date_time(raw.start_date_time)
    }
}

/// Points at a plan that already exists on the task board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawPlanReference")]
pub struct PlanReference {
    plan_id: String,
    plan_title: String,
    confidence_score: f64,
}

impl PlanReference {
    pub fn new(
        plan_id: impl Into<String>,
        plan_title: impl Into<String>,
        confidence_score: f64,
    ) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&confidence_score) {
            return Err(Error::Validation(format!(
                "confidence_score must be between 0.0 and 1.0, got {confidence_score}"
            )));
        }

        Ok(Self {
            plan_id: plan_id.into(),
            plan_title: plan_title.into(),
            confidence_score,
        })
    }

    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn plan_title(&self) -> &str {
        &self.plan_title
    }

    pub fn confidence_score(&self) -> f64 {
        self.confidence_score
    }
}

#[derive(Deserialize)]
struct RawPlanReference {
    plan_id: String,
    plan_title: String,
    confidence_score: f64,
}

impl TryFrom<RawPlanReference> for PlanReference {
    type Error = Error;

    fn try_from(raw: RawPlanReference) -> Result<Self, Self::Error> {
        PlanReference::new(raw.plan_id, raw.plan_title, raw.confidence_score)
    }
}

/// Whether a task group reuses a plan or needs a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssociationType {
    Existing,
    New,
}

impl fmt::Display for AssociationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationType::Existing => write!(f, "existing"),
            AssociationType::New => write!(f, "new"),
        }
    }
}

/// Links a task group to a plan.
///
/// `plan_reference` is present exactly when `association_type` is `Existing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawPlanAssociation")]
pub struct PlanAssociation {
    association_type: AssociationType,
    plan_title: String,
    plan_reference: Option<PlanReference>,
    rationale: Option<String>,
}

impl PlanAssociation {
    pub fn new(
        association_type: AssociationType,
        plan_title: impl Into<String>,
        plan_reference: Option<PlanReference>,
        rationale: Option<String>,
    ) -> Result<Self, Error> {
        match (association_type, &plan_reference) {
            (AssociationType::Existing, None) => Err(Error::Validation(
                "plan_reference is required when association_type is 'existing'".to_string(),
            )),
            (AssociationType::New, Some(_)) => Err(Error::Validation(
                "plan_reference must not be set when association_type is 'new'".to_string(),
            )),
            _ => Ok(Self::new_unchecked(
                association_type,
                plan_title,
                plan_reference,
                rationale,
            )),
        }
    }

    /// Association with a plan that already exists on the task board.
    pub fn existing(plan_title: impl Into<String>, plan_reference: PlanReference) -> Self {
        Self::new_unchecked(
            AssociationType::Existing,
            plan_title,
            Some(plan_reference),
            None,
        )
    }

    /// Association with a plan that has to be created.
    pub fn new_plan(plan_title: impl Into<String>) -> Self {
        Self::new_unchecked(AssociationType::New, plan_title, None, None)
    }

    /// Builds an association without checking that `plan_reference` matches
    /// `association_type`.
    ///
    /// Consumers must still treat the reference as optional: values built here
    /// mirror data that skipped validation on its way in.
    pub fn new_unchecked(
        association_type: AssociationType,
        plan_title: impl Into<String>,
        plan_reference: Option<PlanReference>,
        rationale: Option<String>,
    ) -> Self {
        Self {
            association_type,
            plan_title: plan_title.into(),
            plan_reference,
            rationale,
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    pub fn association_type(&self) -> AssociationType {
        self.association_type
    }

    pub fn plan_title(&self) -> &str {
        &self.plan_title
    }

    pub fn plan_reference(&self) -> Option<&PlanReference> {
        self.plan_reference.as_ref()
    }

    pub fn rationale(&self) -> Option<&str> {
        self.rationale.as_deref()
    }
}

#[derive(Deserialize)]
struct RawPlanAssociation {
    association_type: AssociationType,
    plan_title: String,
    #[serde(default)]
    plan_reference: Option<PlanReference>,
    #[serde(default)]
    rationale: Option<String>,
}

impl TryFrom<RawPlanAssociation> for PlanAssociation {
    type Error = Error;

    fn try_from(raw: RawPlanAssociation) -> Result<Self, Self::Error> {
        PlanAssociation::new(
            raw.association_type,
            raw.plan_title,
            raw.plan_reference,
            raw.rationale,
        )
    }
}

/// Related tasks that share one plan. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawTaskGroup")]
pub struct TaskGroup {
    plan_association: PlanAssociation,
    tasks: Vec<TranscriptionTask>,
    group_description: Option<String>,
}

impl TaskGroup {
    pub fn new(
        plan_association: PlanAssociation,
        tasks: Vec<TranscriptionTask>,
        group_description: Option<String>,
    ) -> Result<Self, Error> {
        if tasks.is_empty() {
            return Err(Error::Validation(format!(
                "task group for plan '{}' has no tasks",
                plan_association.plan_title()
            )));
        }

        Ok(Self {
            plan_association,
            tasks,
            group_description,
        })
    }

    pub fn plan_association(&self) -> &PlanAssociation {
        &self.plan_association
    }

    pub fn tasks(&self) -> &[TranscriptionTask] {
        &self.tasks
    }

    pub fn group_description(&self) -> Option<&str> {
        self.group_description.as_deref()
    }
}

#[derive(Deserialize)]
struct RawTaskGroup {
    plan_association: PlanAssociation,
    tasks: Vec<TranscriptionTask>,
    #[serde(default)]
    group_description: Option<String>,
}

impl TryFrom<RawTaskGroup> for TaskGroup {
    type Error = Error;

    fn try_from(raw: RawTaskGroup) -> Result<Self, Self::Error> {
        TaskGroup::new(raw.plan_association, raw.tasks, raw.group_description)
    }
}

/// What an analysis provider returns for a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMeeting {
    #[serde(default)]
    pub task_groups: Vec<TaskGroup>,
    #[serde(default)]
    pub meeting_summary: Option<String>,
}

/// A fully extracted meeting, ready to be persisted and synced.
///
/// `action_items_count` always equals the number of tasks across all groups.
/// A count supplied in JSON is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawMeetingExtractionResult")]
pub struct MeetingExtractionResult {
    meeting_details: MeetingDetails,
    task_groups: Vec<TaskGroup>,
    action_items_count: usize,
    meeting_date: Option<String>,
    meeting_summary: Option<String>,
}

impl MeetingExtractionResult {
    pub fn new(
        meeting_details: MeetingDetails,
        task_groups: Vec<TaskGroup>,
        meeting_summary: Option<String>,
        meeting_date: Option<String>,
    ) -> Result<Self, Error> {
        let meeting_date = validate_iso8601("meeting_date", meeting_date)?;
        validate_iso8601("meeting_details.meeting_date", meeting_details.date.clone())?;

        let action_items_count = task_groups.iter().map(|group| group.tasks().len()).sum();

        Ok(Self {
            meeting_details,
            task_groups,
            action_items_count,
            meeting_date,
            meeting_summary,
        })
    }

    /// Combines a provider's extraction with the caller's meeting details.
    /// The meeting date is taken from the details.
    pub fn from_extraction(
        extracted: ExtractedMeeting,
        meeting_details: MeetingDetails,
    ) -> Result<Self, Error> {
        let meeting_date = meeting_details.date.clone();
        Self::new(
            meeting_details,
            extracted.task_groups,
            extracted.meeting_summary,
            meeting_date,
        )
    }

    pub fn meeting_details(&self) -> &MeetingDetails {
        &self.meeting_details
    }

    pub fn task_groups(&self) -> &[TaskGroup] {
        &self.task_groups
    }

    pub fn action_items_count(&self) -> usize {
        self.action_items_count
    }

    pub fn meeting_date(&self) -> Option<&str> {
        self.meeting_date.as_deref()
    }

    pub fn meeting_date_utc(&self) -> Option<DateTime<Utc>> {
        self.meeting_date.as_deref().and_then(parse_iso8601)
    }

    /// The meeting date in the offset it was written with.
    pub fn meeting_date_local(&self) -> Option<DateTime<FixedOffset>> {
        self.meeting_date.as_deref().and_then(parse_iso8601_local)
    }

    pub fn meeting_summary(&self) -> Option<&str> {
        self.meeting_summary.as_deref()
    }
}

#[derive(Deserialize)]
struct RawMeetingExtractionResult {
    meeting_details: MeetingDetails,
    task_groups: Vec<TaskGroup>,
    #[serde(default)]
    meeting_date: Option<String>,
    #[serde(default)]
    meeting_summary: Option<String>,
}

impl TryFrom<RawMeetingExtractionResult> for MeetingExtractionResult {
    type Error = Error;

    fn try_from(raw: RawMeetingExtractionResult) -> Result<Self, Self::Error> {
        MeetingExtractionResult::new(
            raw.meeting_details,
            raw.task_groups,
            raw.meeting_summary,
            raw.meeting_date,
        )
    }
}

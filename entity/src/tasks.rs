//! SeaORM Entity for tasks table.
//! Stores extracted action items together with their task board sync state.

use crate::task_status::TaskStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::tasks::Model)]
#[sea_orm(schema_name = "meeting_tasks", table_name = "tasks")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub meeting_id: Id,

    #[schema(value_type = Option<Uuid>)]
    pub goal_id: Option<Id>,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    pub status: TaskStatus,

    /// Descriptive priority label (urgent, important, medium, low)
    pub priority: String,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<DateTimeWithTimeZone>,

    /// Resolved owner; assignee names live in `metadata` until reconciled
    #[schema(value_type = Option<Uuid>)]
    pub assignee_id: Option<Id>,

    #[schema(value_type = Option<Uuid>)]
    pub department_id: Option<Id>,

    /// Task board task ID, set once the task has been synced
    pub planner_task_id: Option<String>,

    /// Task board plan ID, set once the task has been synced
    pub planner_plan_id: Option<String>,

    /// Plan title, assignee names and checklist items as extracted
    #[schema(value_type = Object)]
    pub metadata: Json,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Meetings,

    #[sea_orm(
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Goals,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! SeaORM Entity for meetings table.
//! One row per processed transcript.

use crate::meeting_status::MeetingStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::meetings::Model)]
#[sea_orm(schema_name = "meeting_tasks", table_name = "meetings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    pub title: String,

    /// When the meeting took place, if the caller supplied it
    #[schema(value_type = Option<String>, format = DateTime)]
    pub date: Option<DateTimeWithTimeZone>,

    /// AI-generated summary of the meeting
    #[sea_orm(column_type = "Text")]
    pub summary: Option<String>,

    /// Storage path of the original transcript file
    pub transcript_path: Option<String>,

    /// Authenticated user that submitted the meeting
    #[schema(value_type = Option<Uuid>)]
    pub host_id: Option<Id>,

    pub status: MeetingStatus,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

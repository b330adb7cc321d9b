use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Processing state of a meeting record.
#[derive(
    Debug,
    Clone,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "meeting_status")]
pub enum MeetingStatus {
    /// Transcript received, extraction still running
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Extraction finished and action items were stored
    #[sea_orm(string_value = "completed")]
    #[default]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingStatus::Processing => write!(fmt, "processing"),
            MeetingStatus::Completed => write!(fmt, "completed"),
            MeetingStatus::Failed => write!(fmt, "failed"),
        }
    }
}

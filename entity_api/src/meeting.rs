use super::error::Error;
use entity::meeting_status::MeetingStatus;
use entity::meetings::{ActiveModel, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*, ActiveModelTrait, ActiveValue::Set, ConnectionTrait, TryIntoModel,
};

use log::*;

/// Inserts a completed meeting row. Accepts any connection so it can join an
/// open transaction.
pub async fn create<C>(
    db: &C,
    title: String,
    date: Option<DateTimeWithTimeZone>,
    summary: Option<String>,
    host_id: Option<Id>,
) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!("New Meeting to be inserted: {title}");

    let now = chrono::Utc::now();

    let meeting_active_model: ActiveModel = ActiveModel {
        title: Set(title),
        date: Set(date),
        summary: Set(summary),
        transcript_path: Set(None),
        host_id: Set(host_id),
        status: Set(MeetingStatus::Completed),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(meeting_active_model.save(db).await?.try_into_model()?)
}

pub async fn find_by_id<C>(db: &C, id: Id) -> Result<Option<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find_by_id(id).one(db).await?)
}

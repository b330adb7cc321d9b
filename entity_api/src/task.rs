use super::error::{EntityApiErrorKind, Error};
use entity::tasks::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*,
    ActiveModelTrait,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder, TryIntoModel,
};

use log::*;

/// Inserts a task row from `task_model`. The id and timestamps of the given
/// model are ignored.
pub async fn create<C>(db: &C, task_model: Model) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!("New Task Model to be inserted: {task_model:?}");

    let now = chrono::Utc::now();

    let task_active_model: ActiveModel = ActiveModel {
        meeting_id: Set(task_model.meeting_id),
        goal_id: Set(task_model.goal_id),
        title: Set(task_model.title),
        description: Set(task_model.description),
        status: Set(task_model.status),
        priority: Set(task_model.priority),
        due_date: Set(task_model.due_date),
        assignee_id: Set(task_model.assignee_id),
        department_id: Set(task_model.department_id),
        planner_task_id: Set(task_model.planner_task_id),
        planner_plan_id: Set(task_model.planner_plan_id),
        metadata: Set(task_model.metadata),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(task_active_model.save(db).await?.try_into_model()?)
}

/// Records the task board identifiers a task was synced to.
pub async fn update_planner_ids<C>(
    db: &C,
    id: Id,
    planner_task_id: String,
    planner_plan_id: String,
) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    let task = find_by_id(db, id).await?;

    debug!("Existing Task model to be Updated with task board ids: {task:?}");

    let active_model: ActiveModel = ActiveModel {
        id: Unchanged(task.id),
        meeting_id: Unchanged(task.meeting_id),
        goal_id: Unchanged(task.goal_id),
        title: Unchanged(task.title),
        description: Unchanged(task.description),
        status: Unchanged(task.status),
        priority: Unchanged(task.priority),
        due_date: Unchanged(task.due_date),
        assignee_id: Unchanged(task.assignee_id),
        department_id: Unchanged(task.department_id),
        planner_task_id: Set(Some(planner_task_id)),
        planner_plan_id: Set(Some(planner_plan_id)),
        metadata: Unchanged(task.metadata),
        created_at: Unchanged(task.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

pub async fn find_by_id<C>(db: &C, id: Id) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        error!("Task with id {id} not found");
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    })
}

/// Finds all tasks of a meeting in insertion order.
pub async fn find_by_meeting_id<C>(db: &C, meeting_id: Id) -> Result<Vec<Model>, Error>
where
    C: ConnectionTrait,
{
    Ok(Entity::find()
        .filter(Column::MeetingId.eq(meeting_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

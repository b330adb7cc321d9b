use super::error::Error;
use entity::goals::{ActiveModel, Model};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, TryIntoModel};

use log::*;

pub async fn create<C>(
    db: &C,
    title: String,
    description: Option<String>,
    year: i32,
) -> Result<Model, Error>
where
    C: ConnectionTrait,
{
    debug!("New Goal to be inserted: {title} ({year})");

    let now = chrono::Utc::now();

    let goal_active_model: ActiveModel = ActiveModel {
        title: Set(title),
        description: Set(description),
        year: Set(year),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(goal_active_model.save(db).await?.try_into_model()?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::Id;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn create_returns_a_new_goal_model() -> Result<(), Error> {
        let now = chrono::Utc::now();

        let goal_model = Model {
            id: Id::new_v4(),
            title: "Website Redesign".to_owned(),
            description: Some("Goal for plan: Website Redesign".to_owned()),
            year: 2024,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![goal_model.clone()]])
            .into_connection();

        let goal = create(
            &db,
            "Website Redesign".to_owned(),
            Some("Goal for plan: Website Redesign".to_owned()),
            2024,
        )
        .await?;

        assert_eq!(goal.id, goal_model.id);
        assert_eq!(goal.year, 2024);

        Ok(())
    }
}

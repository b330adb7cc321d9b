use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TYPE meeting_tasks.meeting_status AS ENUM (
                'processing',
                'completed',
                'failed'
            )",
        )
        .await?;

        db.execute_unprepared(
            "CREATE TYPE meeting_tasks.task_status AS ENUM (
                'todo',
                'in_progress',
                'done'
            )",
        )
        .await?;

        let create_meetings_sql = r#"
            CREATE TABLE IF NOT EXISTS meeting_tasks.meetings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                title VARCHAR(255) NOT NULL,
                date TIMESTAMPTZ,
                summary TEXT,
                transcript_path VARCHAR(1024),
                host_id UUID,
                status meeting_tasks.meeting_status NOT NULL DEFAULT 'completed',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_meetings_sql).await?;

        let create_goals_sql = r#"
            CREATE TABLE IF NOT EXISTS meeting_tasks.goals (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                title VARCHAR(255) NOT NULL,
                description TEXT,
                year INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_goals_sql).await?;

        let create_tasks_sql = r#"
            CREATE TABLE IF NOT EXISTS meeting_tasks.tasks (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                meeting_id UUID NOT NULL
                    REFERENCES meeting_tasks.meetings(id) ON DELETE CASCADE,
                goal_id UUID
                    REFERENCES meeting_tasks.goals(id) ON DELETE SET NULL,
                title VARCHAR(255) NOT NULL,
                description TEXT,
                status meeting_tasks.task_status NOT NULL DEFAULT 'todo',
                priority VARCHAR(32) NOT NULL DEFAULT 'medium',
                due_date TIMESTAMPTZ,
                assignee_id UUID,
                department_id UUID,
                planner_task_id VARCHAR(255),
                planner_plan_id VARCHAR(255),
                metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;
        db.execute_unprepared(create_tasks_sql).await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS tasks_meeting_id_idx ON meeting_tasks.tasks (meeting_id)",
        )
        .await?;

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS tasks_goal_id_idx ON meeting_tasks.tasks (goal_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared("DROP TABLE IF EXISTS meeting_tasks.tasks")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS meeting_tasks.goals")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS meeting_tasks.meetings")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS meeting_tasks.task_status")
            .await?;
        db.execute_unprepared("DROP TYPE IF EXISTS meeting_tasks.meeting_status")
            .await?;

        Ok(())
    }
}

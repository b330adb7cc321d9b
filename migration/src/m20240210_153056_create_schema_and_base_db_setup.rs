use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS meeting_tasks;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO meeting_tasks, public;")
            .await?;

        // gen_random_uuid() is built in from Postgres 13, older servers need pgcrypto
        manager
            .get_connection()
            .execute_unprepared("CREATE EXTENSION IF NOT EXISTS pgcrypto;")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CASCADE removes every table and type created in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS meeting_tasks CASCADE;")
            .await?;

        Ok(())
    }
}

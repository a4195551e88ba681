use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_users_sql = r#"
            CREATE TABLE IF NOT EXISTS post_feed.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email VARCHAR(255) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_users_sql)
            .await?;

        let create_posts_sql = r#"
            CREATE TABLE IF NOT EXISTS post_feed.posts (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                post_content TEXT NOT NULL,
                user_id UUID NOT NULL REFERENCES post_feed.users(id) ON DELETE CASCADE,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_posts_sql)
            .await?;

        // Listing pages through posts oldest first
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_posts_created_at
                 ON post_feed.posts(created_at)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_posts_user_id
                 ON post_feed.posts(user_id)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS post_feed.posts")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS post_feed.users")
            .await?;

        Ok(())
    }
}

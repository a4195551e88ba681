pub use sea_orm_migration::prelude::*;

mod m20260110_000001_create_post_feed_schema;
mod m20260110_000002_create_users_and_posts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260110_000001_create_post_feed_schema::Migration),
            Box::new(m20260110_000002_create_users_and_posts::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_listed_in_order() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|migration| migration.name().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();

        assert_eq!(names.len(), 2);
        assert_eq!(names, sorted);
    }
}

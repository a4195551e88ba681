use super::error::Error;
use entity::posts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder, QuerySelect,
};

use log::*;

pub async fn create(db: &impl ConnectionTrait, post_model: Model, user_id: Id) -> Result<Model, Error> {
    debug!("New Post Model to be inserted: {post_model:?}");

    let now = chrono::Utc::now();

    let post_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        post_content: Set(post_model.post_content),
        user_id: Set(user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(post_active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Updates the content of a post owned by `user_id`. A post that exists but
/// belongs to someone else is reported as not found.
pub async fn update(
    db: &impl ConnectionTrait,
    id: Id,
    user_id: Id,
    model: Model,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id)
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?;

    match result {
        Some(post) => {
            debug!("Existing Post model to be Updated: {post:?}");

            let active_model: ActiveModel = ActiveModel {
                id: Unchanged(post.id),
                post_content: Set(model.post_content),
                user_id: Unchanged(post.user_id),
                created_at: Unchanged(post.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?)
        }
        None => {
            error!("Post with id {id} owned by user {user_id} not found");
            Err(Error::not_found())
        }
    }
}

/// Deletes a post owned by `user_id`.
pub async fn delete_by_id(db: &impl ConnectionTrait, id: Id, user_id: Id) -> Result<(), Error> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        error!("Post with id {id} owned by user {user_id} not found");
        return Err(Error::not_found());
    }

    Ok(())
}

/// Returns page `page` (zero-based) of posts, oldest first.
pub async fn find_page(
    db: &impl ConnectionTrait,
    page: u64,
    page_size: u64,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_asc(Column::CreatedAt)
        .limit(page_size)
        .offset(page.saturating_mul(page_size))
        .all(db)
        .await?)
}

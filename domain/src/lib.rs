//! Business operations of the post feed.
//!
//! Re-exports the entity models through `entity_api` so that consumers of the `domain`
//! crate (ex. `web`) never need to depend on the lower layers directly.
pub use entity_api::{jwt as jwts, posts, users, Id};

pub mod error;
pub mod jwt;
pub mod post;
pub mod user;

use serde::Serialize;
use utoipa::ToSchema;

/// Represents a JSON Web Token (JWT) issued on login.
/// Note: This struct does not have a corresponding entity in the database.
///
/// - `token`: the encoded JWT, serialized as `id_token`.
/// - `sub`: the subject (user id) the token was issued for, kept for convenience
///   and not serialized.
#[derive(Serialize, Debug, ToSchema)]
#[schema(as = jwt::Jwt)] // OpenAPI schema
pub struct Jwt {
    #[serde(rename = "id_token")]
    pub token: String,
    #[serde(skip_serializing)]
    pub sub: String,
}

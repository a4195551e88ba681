//! Claims carried by the tokens this service issues.

use serde::{Deserialize, Serialize};

/// Registered claims of an access token issued on login.
///
/// `sub` holds the user's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

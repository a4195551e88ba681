//! This module holds typed parameters for various endpoint inputs.
//!
//! By using typed parameters, we can ensure that the inputs are validated (by type)
//! and correctly formatted before they are processed by the application logic.

pub(crate) mod post;

use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct IndexParams {
    /// Zero-based page number, defaults to the first page.
    pub(crate) page: Option<u64>,
}

//! DTOs for stacks API responses that are not stack records themselves.

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WhoAmI {
    pub user: String,
    pub user_id: String,

    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct ApiError {
    #[serde(default)]
    pub(super) message: String,
}

/// Outcome of a listing request against the stacks endpoint.
#[derive(Debug)]
pub enum StackListResponse {
    Updated {
        stacks: Vec<crate::model::Stack>,
        etag: Option<String>,
    },
    /// The cached copy is still valid; no body was sent.
    NotModified,
}

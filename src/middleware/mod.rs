pub mod auth;
pub mod payload;
pub mod response;

pub use auth::{auth_gate, bearer_token, PUBLIC_PATHS};
pub use payload::{require_non_empty, Payload};
pub use response::{ApiResponse, ApiResult};

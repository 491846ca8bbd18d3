pub mod auth;
pub mod json;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthenticatedAccount, TOKEN_HEADER};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};

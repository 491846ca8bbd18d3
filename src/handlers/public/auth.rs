// handlers/public/auth.rs - Credential login
//
// Unknown usernames and wrong passwords produce the same 401.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "userName")]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub account_id: i32,
    pub expires_in_hours: u64,
}

/// GET /login - Verify credentials and return a signed token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let account = match state.storage.get_account_by_username(request.username.trim()).await {
        Ok(account) => account,
        Err(e) if e.is_not_found() => {
            warn!("Login attempt for unknown user '{}'", request.username);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
        Err(e) => return Err(e.into()),
    };

    if !state
        .storage
        .verify_credential(&request.password, &account.password_hash)
        .await
    {
        warn!("Invalid password for account {}", account.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue_token(&account)?;
    info!("Account {} logged in", account.id);

    Ok(ApiResponse::success(LoginResponse {
        token,
        account_id: account.id,
        expires_in_hours: state.tokens.expiry_hours(),
    }))
}

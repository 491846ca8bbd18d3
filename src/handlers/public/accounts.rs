// handlers/public/accounts.rs - Account signup

use axum::extract::State;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::database::models::{
    fits_name_column, Account, CreateAccountRequest, NewAccount, MAX_NAME_LENGTH,
};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub account: Account,
    pub token: String,
}

/// POST /accounts - Create an account and issue its first token
pub async fn accounts_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> ApiResult<CreateAccountResponse> {
    let user_name = request.user_name.trim();

    let mut field_errors = HashMap::new();
    if user_name.is_empty() {
        field_errors.insert("userName".to_string(), "This field is required".to_string());
    }
    if !fits_name_column(user_name) {
        field_errors.insert(
            "userName".to_string(),
            format!("Must be at most {} characters", MAX_NAME_LENGTH),
        );
    }
    if request.password.is_empty() {
        field_errors.insert("password".to_string(), "This field is required".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Invalid account fields",
            Some(field_errors),
        ));
    }

    let account = state
        .storage
        .create_account(&NewAccount::new(user_name, request.password))
        .await?;

    let token = state.tokens.issue_token(&account)?;
    info!("Created account {} and issued its token", account.id);

    Ok(ApiResponse::created(CreateAccountResponse { account, token }))
}

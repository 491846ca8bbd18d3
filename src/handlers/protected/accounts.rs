use axum::extract::{Extension, State};

use crate::database::models::Account;
use crate::middleware::{ApiResponse, ApiResult, AuthenticatedAccount};
use crate::AppState;

use super::caller_account;

/// GET /accounts - List all accounts (password hashes are never serialized)
pub async fn accounts_get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> ApiResult<Vec<Account>> {
    let caller = caller_account(&state, caller).await?;
    tracing::debug!("Account {} listing accounts", caller.id);

    let accounts = state.storage.get_accounts().await?;
    Ok(ApiResponse::success(accounts))
}

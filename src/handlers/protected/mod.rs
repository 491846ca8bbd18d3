// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Routed behind `jwt_auth_middleware`; each handler receives the caller as
// an `Extension<AuthenticatedAccount>` argument.

pub mod accounts; // GET /accounts
pub mod ratings; // POST /gyms/:id/ratings

pub use accounts::accounts_get;
pub use ratings::gym_ratings_post;

use crate::database::models::Account;
use crate::error::ApiError;
use crate::middleware::AuthenticatedAccount;
use crate::AppState;

/// Loads the account behind a validated token. A token whose account no
/// longer exists is treated as unauthenticated.
pub(crate) async fn caller_account(
    state: &AppState,
    caller: AuthenticatedAccount,
) -> Result<Account, ApiError> {
    match state.storage.get_account_by_id(caller.account_id).await {
        Ok(account) => Ok(account),
        Err(e) if e.is_not_found() => {
            tracing::warn!("Token refers to missing account {}", caller.account_id);
            Err(ApiError::unauthorized("Unable to resolve account for token"))
        }
        Err(e) => Err(e.into()),
    }
}

// handlers/protected/ratings.rs - Rate a gym as the authenticated caller

use axum::extract::{Extension, Path, State};
use tracing::info;

use crate::database::models::{CreateRatingRequest, Rating};
use crate::handlers::utils::{non_blank, parse_id};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthenticatedAccount};
use crate::AppState;

use super::caller_account;

/// POST /gyms/:id/ratings - Create a rating authored by the caller
pub async fn gym_ratings_post(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<CreateRatingRequest>,
) -> ApiResult<Rating> {
    let gym_id = parse_id(&id)?;
    let account = caller_account(&state, caller).await?;

    // Structured 404 for an unknown gym instead of a constraint error
    let gym = state.storage.get_gym_by_id(gym_id).await?;

    let rating = Rating::new(
        gym.id,
        request.rating,
        account.user_name,
        non_blank(request.review),
    );
    let created = state.storage.create_rating(&rating).await?;

    info!("Account {} rated gym {} with {}", account.id, gym.id, created.rating);
    Ok(ApiResponse::created(created))
}

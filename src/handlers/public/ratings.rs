use axum::extract::{Path, State};

use crate::database::models::Rating;
use crate::handlers::utils::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /gyms/:id/ratings - Ratings of one gym, oldest first
pub async fn gym_ratings_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Rating>> {
    let id = parse_id(&id)?;

    // 404 for unknown gyms rather than an empty list
    state.storage.get_gym_by_id(id).await?;
    let ratings = state.storage.get_ratings(id).await?;

    Ok(ApiResponse::success(ratings))
}

// handlers/public/gyms.rs - Gym CRUD

use axum::extract::{Path, State};
use serde::Serialize;
use tracing::{debug, info};

use crate::database::models::{CreateGymRequest, Gym, UpdateGymRequest};
use crate::error::ApiError;
use crate::handlers::utils::{check_name_length, non_blank, parse_id};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DeletedGym {
    pub deleted: i32,
}

/// GET /gyms - List all gyms with their average rating
pub async fn gyms_get(State(state): State<AppState>) -> ApiResult<Vec<Gym>> {
    debug!("Received request to GET all gyms");
    let gyms = state.storage.get_gyms().await?;
    Ok(ApiResponse::success(gyms))
}

/// GET /gyms/:id - One gym with its average rating
pub async fn gym_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Gym> {
    let id = parse_id(&id)?;
    debug!("Received request to GET gym with id {}", id);

    let gym = state.storage.get_gym_by_id(id).await?;
    let rating = state.storage.get_average_rating(id).await?;

    Ok(ApiResponse::success(gym.with_rating(rating)))
}

/// POST /gyms - Create a gym from `{name, description}`
pub async fn gyms_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateGymRequest>,
) -> ApiResult<Gym> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    check_name_length("name", name)?;

    let gym = Gym::new(name, non_blank(request.description));
    let created = state.storage.create_gym(&gym).await?;

    info!("Gym {} created", created.id);
    Ok(ApiResponse::created(created))
}

/// PUT /gyms/:id - Replace name and description
pub async fn gym_put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateGymRequest>,
) -> ApiResult<Gym> {
    let id = parse_id(&id)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::missing_field("name"));
    }
    check_name_length("name", name)?;

    let mut gym = state.storage.get_gym_by_id(id).await?;
    gym.name = name.to_string();
    gym.description = non_blank(request.description);

    let updated = state.storage.update_gym(&gym).await?;
    let rating = state.storage.get_average_rating(id).await?;

    Ok(ApiResponse::success(updated.with_rating(rating)))
}

/// DELETE /gyms/:id - Delete a gym and, by cascade, its ratings
pub async fn gym_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedGym> {
    let id = parse_id(&id)?;
    debug!("Received request to DELETE gym with id {}", id);

    state.storage.delete_gym(id).await?;
    Ok(ApiResponse::success(DeletedGym { deleted: id }))
}

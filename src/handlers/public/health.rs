use serde_json::{json, Value};

use crate::middleware::ApiResponse;

/// GET /healthcheck - Static liveness probe
pub async fn healthcheck_get() -> ApiResponse<Value> {
    tracing::debug!("Received healthcheck request");
    ApiResponse::success(json!({ "status": "OK" }))
}

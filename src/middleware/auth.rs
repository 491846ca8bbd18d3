use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::AppState;

/// Header carrying the signed token on every protected call
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// Caller identity resolved from a valid token. Protected handlers take it
/// as an `Extension<AuthenticatedAccount>` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: i32,
}

/// JWT authentication middleware that validates tokens and extracts the caller.
///
/// Runs before the wrapped handler; on any failure it answers 401 and the
/// handler (and therefore storage) is never reached.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(|msg| {
        tracing::warn!("Rejected request to {}: {}", request.uri().path(), msg);
        ApiError::unauthorized(msg)
    })?;

    let account_id = state.tokens.validate_token(&token).map_err(|e| {
        tracing::warn!("Error validating JWT: {}", e);
        ApiError::from(e)
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedAccount { account_id });

    Ok(next.run(request).await)
}

/// Reads the token from `x-jwt-token`, falling back to `Authorization: Bearer`
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    if let Some(value) = headers.get(TOKEN_HEADER) {
        let token = value
            .to_str()
            .map_err(|_| "Invalid token header format".to_string())?
            .trim();
        if token.is_empty() {
            return Err("Empty JWT token".to_string());
        }
        return Ok(token.to_string());
    }

    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| format!("Missing {} header", TOKEN_HEADER))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_custom_header() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("abc"));
        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc");
    }

    #[test]
    fn falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "xyz");

        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }

    #[test]
    fn missing_or_blank_is_rejected() {
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static("   "));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }
}

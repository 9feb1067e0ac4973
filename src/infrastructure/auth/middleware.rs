use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::{
    domain::auth::{AuthService, UserId},
    error::AppError,
};

/// User context injected into request extensions after authentication
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Authentication middleware: requires a valid access token
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

    let user_id = auth_service
        .authenticate(token)
        .map_err(|e| AppError::Unauthorized(format!("Invalid access token: {}", e)))?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::auth::{AuthService, RefreshTokenRequest, TokenResponse},
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

const REFRESH_TOKEN_GRANT: &str = "refresh_token";

pub struct AuthController {
    auth_service: Arc<AuthService>,
}

impl AuthController {
    pub fn new(auth_service: Arc<AuthService>) -> Self {
        Self { auth_service }
    }

    /// POST /auth/token - Exchange a refresh token for a new pair
    pub async fn token(
        State(controller): State<Arc<AuthController>>,
        Json(request): Json<RefreshTokenRequest>,
    ) -> AppResult<Json<TokenResponse>> {
        if let Some(grant_type) = request.grant_type.as_deref() {
            if grant_type != REFRESH_TOKEN_GRANT {
                return Err(AppError::BadRequest(format!(
                    "unsupported grant_type '{}'",
                    grant_type
                )));
            }
        }

        // Missing token is rejected like any other invalid one
        let refresh_token = request
            .refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(AppError::InvalidRefreshToken)?;

        let session = controller.auth_service.rotate(&refresh_token).await?;
        Ok(Json(controller.auth_service.to_response(session)))
    }

    /// POST /auth/logout - Revoke the caller's refresh token
    pub async fn logout(
        State(controller): State<Arc<AuthController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<StatusCode> {
        controller.auth_service.logout(&auth_user.user_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::infrastructure::config::Config;
use crate::{
    controllers::{auth::AuthController, health},
    domain::auth::AuthService,
    infrastructure::{
        auth::{auth_middleware, request_id_middleware},
        repositories::RefreshTokenStore,
    },
};

/// Assemble every route with its middleware stack
pub fn build_router(
    config: &Config,
    auth_service: Arc<AuthService>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
) -> Router {
    let auth_controller = Arc::new(AuthController::new(auth_service.clone()));

    // Token renewal (public - the refresh token is the credential)
    let auth_routes = Router::new()
        .route("/auth/token", post(AuthController::token))
        .with_state(auth_controller.clone());

    // Logout requires a valid access token
    let auth_protected_routes = Router::new()
        .route("/auth/logout", post(AuthController::logout))
        .with_state(auth_controller)
        .layer(middleware::from_fn_with_state(auth_service, auth_middleware));

    let cors = if config.is_development() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(refresh_tokens)
        .merge(auth_routes)
        .merge(auth_protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(cors),
        )
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    auth_service: Arc<AuthService>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(&config, auth_service, refresh_tokens);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

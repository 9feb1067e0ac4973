use std::sync::Arc;
use tokenkeeper_backend::domain::auth::{AuthService, TokenCodec, TokenKind};
use tokenkeeper_backend::infrastructure::config::{Config, LogFormat};
use tokenkeeper_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use tokenkeeper_backend::infrastructure::http::start_http_server;
use tokenkeeper_backend::infrastructure::repositories::{
    InMemoryRefreshTokenRepository, PgRefreshTokenRepository, RefreshTokenStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Missing or inconsistent signing configuration stops start-up here
    let config = Config::from_env()?;

    init_logging(&config);

    tracing::info!(
        "Starting token service on {}:{}",
        config.host,
        config.port
    );

    let refresh_tokens: Arc<dyn RefreshTokenStore> = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url).await?;
            tracing::info!("Database connection pool created");

            check_connection(&pool).await?;
            tracing::info!("Database connection verified");

            run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");

            Arc::new(PgRefreshTokenRepository::new(Arc::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, refresh tokens are kept in memory and lost on restart");
            Arc::new(InMemoryRefreshTokenRepository::new())
        }
    };

    let codec = Arc::new(TokenCodec::from_config(&config)?);
    tracing::info!(
        access_ttl_secs = codec.ttl(TokenKind::Access).num_seconds(),
        refresh_ttl_secs = codec.ttl(TokenKind::Refresh).num_seconds(),
        "Token codec initialized"
    );

    let auth_service = Arc::new(AuthService::new(codec, refresh_tokens.clone()));

    start_http_server(Arc::new(config), auth_service, refresh_tokens).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tokenkeeper_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "tokenkeeper_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

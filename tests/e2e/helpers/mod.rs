use chrono::Duration;
use std::sync::Arc;
use test_context::AsyncTestContext;
use tokenkeeper_backend::domain::auth::{AuthService, SigningKeys, TokenCodec};
use tokenkeeper_backend::infrastructure::config::{Config, Environment, LogFormat};
use tokenkeeper_backend::infrastructure::http::build_router;
use tokenkeeper_backend::infrastructure::repositories::InMemoryRefreshTokenRepository;
use tokio::net::TcpListener;

pub mod api_client;
pub mod postgres;

use api_client::TestClient;

pub const ACCESS_SECRET: &str = "test-access-secret-for-testing-only";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-testing-only";

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0, // Will be assigned by the OS
        database_url: None,
        access_token_secret: ACCESS_SECRET.to_string(),
        refresh_token_secret: REFRESH_SECRET.to_string(),
        access_token_expiration_minutes: 15,
        refresh_token_expiration_days: 30,
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
    }
}

pub fn test_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::from_config(&test_config()).expect("Failed to build codec"))
}

/// Codec signing with keys the service does not know
pub fn foreign_codec() -> TokenCodec {
    TokenCodec::new(
        SigningKeys::new("someone-elses-access-key", "someone-elses-refresh-key"),
        Duration::minutes(15),
        Duration::days(30),
    )
    .expect("Failed to build codec")
}

/// Service wired to an in-memory store, without HTTP
pub struct Lifecycle {
    pub codec: Arc<TokenCodec>,
    pub store: Arc<InMemoryRefreshTokenRepository>,
    pub auth_service: Arc<AuthService>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let codec = test_codec();
        let store = Arc::new(InMemoryRefreshTokenRepository::new());
        let auth_service = Arc::new(AuthService::new(codec.clone(), store.clone()));

        Self {
            codec,
            store,
            auth_service,
        }
    }
}

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub config: Config,
    pub codec: Arc<TokenCodec>,
    pub store: Arc<InMemoryRefreshTokenRepository>,
    pub auth_service: Arc<AuthService>,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let config = test_config();
            let Lifecycle {
                codec,
                store,
                auth_service,
            } = Lifecycle::new();

            let app = build_router(&config, auth_service.clone(), store.clone());

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = TestClient::new(&base_url);

            Self {
                client,
                config,
                codec,
                store,
                auth_service,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // The server task ends with the test runtime
        }
    }
}

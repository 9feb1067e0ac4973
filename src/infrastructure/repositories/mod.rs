pub mod in_memory_refresh_token_repository;
pub mod refresh_token_repository;

pub use in_memory_refresh_token_repository::InMemoryRefreshTokenRepository;
pub use refresh_token_repository::{PgRefreshTokenRepository, RefreshTokenStore};

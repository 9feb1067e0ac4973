pub mod dto;
pub mod error;
pub mod jwt;
pub mod keys;
pub mod model;
pub mod service;

pub use dto::{RefreshTokenRequest, TokenResponse};
pub use error::{AuthServiceError, DecodeError, ValidationError};
pub use jwt::{Claims, TokenCodec};
pub use keys::{Secret, SigningKeys};
pub use model::{RefreshRecord, Session, TokenKind, TokenPair, UserId};
pub use service::AuthService;

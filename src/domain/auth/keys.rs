use jsonwebtoken::{DecodingKey, EncodingKey};
use std::fmt;

use super::TokenKind;
use crate::infrastructure::config::Config;

/// HMAC secret used to sign one kind of token.
#[derive(Clone)]
pub struct Secret {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Secret {
    pub fn new(raw: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(raw),
            decoding: DecodingKey::from_secret(raw),
        }
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Access and refresh signing secrets, loaded once at start-up.
#[derive(Debug, Clone)]
pub struct SigningKeys {
    access: Secret,
    refresh: Secret,
}

impl SigningKeys {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access: Secret::new(access_secret.as_bytes()),
            refresh: Secret::new(refresh_secret.as_bytes()),
        }
    }

    /// Build from an already validated configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.access_token_secret, &config.refresh_token_secret)
    }

    pub fn access_key(&self) -> &Secret {
        &self.access
    }

    pub fn refresh_key(&self) -> &Secret {
        &self.refresh
    }

    pub fn key_for(&self, kind: TokenKind) -> &Secret {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

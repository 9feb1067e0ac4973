use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DecodeError, SigningKeys, TokenKind, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::{Config, MAX_TOKEN_LIFETIME_DAYS};

const REQUIRED_CLAIMS: [&str; 3] = ["sub", "iat", "exp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time
    pub jti: String, // Unique per token
}

impl Claims {
    pub fn user_id(&self) -> UserId {
        UserId::new(self.sub.clone())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.iat, 0)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.exp, 0)
    }
}

/// Signs and verifies access and refresh tokens (HS256 JWT).
///
/// Holds no mutable state: output depends only on the keys, the TTLs and
/// the clock instant passed in.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: SigningKeys,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Fails unless `access_ttl` is positive and shorter than `refresh_ttl`,
    /// and `refresh_ttl` is at most `MAX_TOKEN_LIFETIME_DAYS`.
    pub fn new(keys: SigningKeys, access_ttl: Duration, refresh_ttl: Duration) -> anyhow::Result<Self> {
        if access_ttl <= Duration::zero() {
            anyhow::bail!("access token TTL must be positive");
        }
        if refresh_ttl > Duration::days(MAX_TOKEN_LIFETIME_DAYS) {
            anyhow::bail!(
                "refresh token TTL ({}s) exceeds {} days",
                refresh_ttl.num_seconds(),
                MAX_TOKEN_LIFETIME_DAYS
            );
        }
        if access_ttl >= refresh_ttl {
            anyhow::bail!(
                "access token TTL ({}s) must be shorter than refresh token TTL ({}s)",
                access_ttl.num_seconds(),
                refresh_ttl.num_seconds()
            );
        }

        Ok(Self {
            keys,
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let access_ttl = Duration::try_minutes(config.access_token_expiration_minutes)
            .ok_or_else(|| anyhow::anyhow!("ACCESS_TOKEN_EXPIRATION_MINUTES is out of range"))?;
        let refresh_ttl = Duration::try_days(config.refresh_token_expiration_days)
            .ok_or_else(|| anyhow::anyhow!("REFRESH_TOKEN_EXPIRATION_DAYS is out of range"))?;

        Self::new(SigningKeys::from_config(config), access_ttl, refresh_ttl)
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a token for `user_id` expiring `ttl(kind)` from now
    pub fn encode(&self, user_id: &UserId, kind: TokenKind) -> AppResult<String> {
        self.encode_at(user_id, kind, Utc::now())
    }

    pub fn encode_at(
        &self,
        user_id: &UserId,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let exp = now.checked_add_signed(self.ttl(kind)).ok_or_else(|| {
            AppError::Internal(format!("{} token expiry overflows at {}", kind, now))
        })?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            self.keys.key_for(kind).encoding_key(),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate {} token: {}", kind, e)))
    }

    /// Verify a token of the given kind and extract its claims
    pub fn decode(&self, token: &str, kind: TokenKind) -> Result<Claims, DecodeError> {
        self.decode_at(token, kind, Utc::now())
    }

    /// Expiry is checked before the signature, so an expired token is
    /// reported as `Expired` whichever key signed it.
    pub fn decode_at(
        &self,
        token: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, DecodeError> {
        let unverified = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &unverified_validation())
            .map_err(|_| DecodeError::Malformed)?
            .claims;

        if now.timestamp() >= unverified.exp {
            return Err(DecodeError::Expired);
        }

        decode::<Claims>(token, self.keys.key_for(kind).decoding_key(), &verified_validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => DecodeError::SignatureInvalid,
                _ => DecodeError::Malformed,
            })
    }
}

fn verified_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // checked against the caller's clock
    validation.leeway = 0;
    validation.set_required_spec_claims(&REQUIRED_CLAIMS);
    validation
}

fn unverified_validation() -> Validation {
    let mut validation = verified_validation();
    validation.insecure_disable_signature_validation();
    validation
}

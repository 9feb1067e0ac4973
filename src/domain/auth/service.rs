use std::sync::Arc;

use super::{
    AuthServiceError, DecodeError, Session, TokenCodec, TokenKind, TokenPair, TokenResponse,
    UserId, ValidationError,
};
use crate::error::AppResult;
use crate::infrastructure::repositories::RefreshTokenStore;

/// Issues, rotates and revokes token pairs.
///
/// A refresh token is accepted only when it both verifies cryptographically
/// and is the value currently stored for its user. Rotation swaps the stored
/// value atomically, so a token can be exchanged at most once.
pub struct AuthService {
    codec: Arc<TokenCodec>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
}

impl AuthService {
    pub fn new(codec: Arc<TokenCodec>, refresh_tokens: Arc<dyn RefreshTokenStore>) -> Self {
        Self {
            codec,
            refresh_tokens,
        }
    }

    /// Lifetime of access tokens in seconds
    pub fn access_token_expires_in(&self) -> i64 {
        self.codec.ttl(TokenKind::Access).num_seconds()
    }

    /// Mint a fresh pair for an authenticated user and make its refresh
    /// token the only valid one. The pair is returned only once stored.
    pub async fn issue(&self, user_id: &UserId) -> Result<TokenPair, AuthServiceError> {
        let pair = self.mint_pair(user_id)?;

        self.refresh_tokens
            .upsert(user_id, &pair.refresh_token)
            .await?;

        tracing::info!(user_id = %user_id, "Issued token pair");
        Ok(pair)
    }

    /// Exchange the current refresh token for a new pair
    pub async fn rotate(&self, presented: &str) -> Result<Session, AuthServiceError> {
        let claims = self
            .codec
            .decode(presented, TokenKind::Refresh)
            .map_err(|e| reject(ValidationError::DecodeFailure(e), None))?;

        let record = self
            .refresh_tokens
            .find_by_token(presented)
            .await?
            .ok_or_else(|| reject(ValidationError::NotCurrent, Some(claims.sub.as_str())))?;

        if claims.sub != record.user_id.as_str() {
            return Err(reject(ValidationError::IdentityMismatch, Some(claims.sub.as_str())));
        }

        let pair = self.mint_pair(&record.user_id)?;

        let swapped = self
            .refresh_tokens
            .replace(&record.user_id, presented, &pair.refresh_token)
            .await?;
        if !swapped {
            // Another request rotated this token between lookup and swap.
            return Err(reject(ValidationError::NotCurrent, Some(claims.sub.as_str())));
        }

        tracing::info!(user_id = %record.user_id, "Rotated refresh token");
        Ok(Session {
            user_id: record.user_id,
            tokens: pair,
        })
    }

    /// Drop the user's refresh record. Returns whether one existed.
    pub async fn logout(&self, user_id: &UserId) -> Result<bool, AuthServiceError> {
        let removed = self.refresh_tokens.delete_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, removed, "Logged out");
        Ok(removed)
    }

    /// Verify an access token and return the identity it carries
    pub fn authenticate(&self, access_token: &str) -> Result<UserId, DecodeError> {
        self.codec
            .decode(access_token, TokenKind::Access)
            .map(|claims| claims.user_id())
    }

    /// Build the wire response for a rotated session
    pub fn to_response(&self, session: Session) -> TokenResponse {
        TokenResponse {
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            expires_in: self.access_token_expires_in(),
            user_id: session.user_id.to_string(),
        }
    }

    fn mint_pair(&self, user_id: &UserId) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.codec.encode(user_id, TokenKind::Access)?,
            refresh_token: self.codec.encode(user_id, TokenKind::Refresh)?,
        })
    }
}

fn reject(reason: ValidationError, subject: Option<&str>) -> AuthServiceError {
    tracing::warn!(reason = %reason, subject = subject.unwrap_or("-"), "Refresh token rejected");
    AuthServiceError::Validation(reason)
}

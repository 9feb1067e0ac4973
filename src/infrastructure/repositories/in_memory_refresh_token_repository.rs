use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::RefreshTokenStore;
use crate::domain::auth::{RefreshRecord, UserId};
use crate::error::AppResult;

#[derive(Default)]
struct Records {
    by_user: HashMap<UserId, String>,
    by_token: HashMap<String, UserId>,
}

impl Records {
    fn set(&mut self, user_id: &UserId, token: &str) {
        if let Some(previous) = self.by_user.insert(user_id.clone(), token.to_string()) {
            self.by_token.remove(&previous);
        }
        self.by_token.insert(token.to_string(), user_id.clone());
    }
}

/// Process-local refresh token store.
///
/// Both indexes live under one lock so every write is a single
/// read-modify-write. Used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    records: RwLock<Records>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users holding a refresh token
    pub fn len(&self) -> usize {
        self.records.read().by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn token_for(&self, user_id: &UserId) -> Option<String> {
        self.records.read().by_user.get(user_id).cloned()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenRepository {
    async fn upsert(&self, user_id: &UserId, token: &str) -> AppResult<()> {
        self.records.write().set(user_id, token);
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshRecord>> {
        let records = self.records.read();
        Ok(records.by_token.get(token).map(|user_id| RefreshRecord {
            user_id: user_id.clone(),
            token: token.to_string(),
        }))
    }

    async fn replace(&self, user_id: &UserId, current: &str, next: &str) -> AppResult<bool> {
        let mut records = self.records.write();
        if records.by_user.get(user_id).map(String::as_str) != Some(current) {
            return Ok(false);
        }
        records.set(user_id, next);
        Ok(true)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AppResult<bool> {
        let mut records = self.records.write();
        match records.by_user.remove(user_id) {
            Some(token) => {
                records.by_token.remove(&token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn check_health(&self) -> AppResult<()> {
        Ok(())
    }
}

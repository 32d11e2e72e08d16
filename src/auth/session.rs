//! Admin sessions.
//!
//! A successful login yields an opaque token; requests present it as a bearer
//! token. The store is owned by the application state and handed to the routes
//! that need it.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::credentials::CredentialChecker;

/// Proof that the current request belongs to a logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub token: String,
}

#[derive(Clone)]
pub struct SessionStore {
    checker: Arc<dyn CredentialChecker>,
    tokens: Arc<RwLock<HashSet<String>>>,
}

impl SessionStore {
    pub fn new(checker: Arc<dyn CredentialChecker>) -> Self {
        Self {
            checker,
            tokens: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Check credentials and open a session on success.
    pub async fn login(&self, username: &str, password: &str) -> Option<AdminSession> {
        if !self.checker.check(username, password) {
            return None;
        }

        let token = Uuid::new_v4().to_string();
        self.tokens.write().await.insert(token.clone());
        Some(AdminSession { token })
    }

    pub async fn validate(&self, token: &str) -> Option<AdminSession> {
        self.tokens.read().await.contains(token).then(|| AdminSession {
            token: token.to_string(),
        })
    }

    /// Returns whether a session was actually closed.
    pub async fn logout(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token)
    }
}

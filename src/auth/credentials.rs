use crate::config::AdminConfig;

/// Decides whether a username/password pair grants admin access.
pub trait CredentialChecker: Send + Sync {
    fn check(&self, username: &str, password: &str) -> bool;
}

/// Compares against the single configured admin account.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl From<&AdminConfig> for StaticCredentials {
    fn from(config: &AdminConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl CredentialChecker for StaticCredentials {
    fn check(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

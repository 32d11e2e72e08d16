pub mod credentials;
pub mod session;

pub use credentials::{CredentialChecker, StaticCredentials};
pub use session::{AdminSession, SessionStore};

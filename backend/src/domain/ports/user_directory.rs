//! Port for resolving user identities referenced by consultations.

use async_trait::async_trait;

use crate::domain::{UserId, UserSummary};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "user directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "user directory query failed: {message}",
    }
}

/// Read-only lookup of users by id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user summary, returning `None` for unknown ids.
    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserSummary>, UserDirectoryError>;
}

/// Fixture directory that knows no users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDirectory;

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn find_user(&self, _user_id: &UserId) -> Result<Option<UserSummary>, UserDirectoryError> {
        Ok(None)
    }
}

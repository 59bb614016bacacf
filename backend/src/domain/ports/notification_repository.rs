//! Port for notification storage: the sink written after status changes and
//! the inbox read side.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{NewNotification, Notification, NotificationId, Recipient};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

/// Port for storing notifications and reading recipient inboxes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store an unread notification.
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError>;

    /// Find a notification by id.
    async fn find_by_id(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;

    /// Page through a recipient's notifications, newest first.
    async fn list_for_recipient(
        &self,
        recipient: &Recipient,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationRepositoryError>;

    /// Count a recipient's unread notifications.
    async fn count_unread(&self, recipient: &Recipient) -> Result<u64, NotificationRepositoryError>;

    /// Mark one notification read. Returns `false` when the id is unknown.
    async fn mark_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread notification for a recipient read, returning how
    /// many changed.
    async fn mark_all_read(&self, recipient: &Recipient)
    -> Result<u64, NotificationRepositoryError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        let id = NotificationId::new(1)
            .map_err(|err| NotificationRepositoryError::query(err.to_string()))?;
        Ok(notification.clone().into_notification(id))
    }

    async fn find_by_id(
        &self,
        _notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        Ok(None)
    }

    async fn list_for_recipient(
        &self,
        _recipient: &Recipient,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        Ok(Page::empty(page))
    }

    async fn count_unread(
        &self,
        _recipient: &Recipient,
    ) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }

    async fn mark_read(
        &self,
        _notification_id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(false)
    }

    async fn mark_all_read(
        &self,
        _recipient: &Recipient,
    ) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }
}

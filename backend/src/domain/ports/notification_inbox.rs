//! Driving ports for a recipient's notification inbox.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, Notification, NotificationId, Recipient};

/// Read side of the inbox.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    /// Page through the recipient's notifications, newest first.
    async fn list_for_recipient(
        &self,
        recipient: Recipient,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error>;

    /// Number of unread notifications for the recipient.
    async fn unread_count(&self, recipient: Recipient) -> Result<u64, Error>;
}

/// Write side of the inbox: read markers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Mark one of the recipient's notifications read.
    ///
    /// Fails with `NotFound` for unknown ids and `Forbidden` when the
    /// notification is addressed to someone else.
    async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient: Recipient,
    ) -> Result<(), Error>;

    /// Mark all of the recipient's notifications read, returning how many
    /// changed.
    async fn mark_all_read(&self, recipient: Recipient) -> Result<u64, Error>;
}

/// Fixture inbox that is always empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationInbox;

#[async_trait]
impl NotificationQuery for FixtureNotificationInbox {
    async fn list_for_recipient(
        &self,
        _recipient: Recipient,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error> {
        Ok(Page::empty(page))
    }

    async fn unread_count(&self, _recipient: Recipient) -> Result<u64, Error> {
        Ok(0)
    }
}

#[async_trait]
impl NotificationCommand for FixtureNotificationInbox {
    async fn mark_read(
        &self,
        notification_id: NotificationId,
        _recipient: Recipient,
    ) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "notification {notification_id} not found"
        )))
    }

    async fn mark_all_read(&self, _recipient: Recipient) -> Result<u64, Error> {
        Ok(0)
    }
}

//! Notification inbox service implementing the notification driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::ports::{
    NotificationCommand, NotificationQuery, NotificationRepository, NotificationRepositoryError,
};
use crate::domain::{Error, Notification, NotificationId, Recipient};

/// Inbox reads and read markers, scoped to the calling recipient.
#[derive(Clone)]
pub struct NotificationService<N> {
    notifications: Arc<N>,
}

impl<N> NotificationService<N> {
    /// Create a service over the notification store.
    pub fn new(notifications: Arc<N>) -> Self {
        Self { notifications }
    }
}

fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

#[async_trait]
impl<N: NotificationRepository> NotificationQuery for NotificationService<N> {
    async fn list_for_recipient(
        &self,
        recipient: Recipient,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error> {
        self.notifications
            .list_for_recipient(&recipient, page)
            .await
            .map_err(map_notification_error)
    }

    async fn unread_count(&self, recipient: Recipient) -> Result<u64, Error> {
        self.notifications
            .count_unread(&recipient)
            .await
            .map_err(map_notification_error)
    }
}

#[async_trait]
impl<N: NotificationRepository> NotificationCommand for NotificationService<N> {
    async fn mark_read(
        &self,
        notification_id: NotificationId,
        recipient: Recipient,
    ) -> Result<(), Error> {
        let not_found = || Error::not_found(format!("notification {notification_id} not found"));
        let notification = self
            .notifications
            .find_by_id(&notification_id)
            .await
            .map_err(map_notification_error)?
            .ok_or_else(not_found)?;
        if notification.recipient != recipient {
            return Err(Error::forbidden("not your notification"));
        }
        if notification.is_read {
            return Ok(());
        }

        let updated = self
            .notifications
            .mark_read(&notification_id)
            .await
            .map_err(map_notification_error)?;
        if updated { Ok(()) } else { Err(not_found()) }
    }

    async fn mark_all_read(&self, recipient: Recipient) -> Result<u64, Error> {
        let updated = self
            .notifications
            .mark_all_read(&recipient)
            .await
            .map_err(map_notification_error)?;
        info!(recipient = %recipient, updated, "marked notifications read");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::MockNotificationRepository;
    use crate::domain::{ConsultationId, ConsultationStatus, ErrorCode, ManagerId, UserId};

    fn user() -> Recipient {
        Recipient::user(UserId::new(1).expect("valid id"))
    }

    fn notification(recipient: Recipient, is_read: bool) -> Notification {
        Notification {
            id: NotificationId::new(5).expect("valid id"),
            recipient,
            consultation_id: ConsultationId::new(100).expect("valid id"),
            status: ConsultationStatus::Confirmed,
            message: "[Blue Bottle] Your consultation has been confirmed.".to_owned(),
            created_at: Utc
                .with_ymd_and_hms(2025, 1, 2, 9, 30, 0)
                .single()
                .expect("valid timestamp"),
            is_read,
        }
    }

    fn id() -> NotificationId {
        NotificationId::new(5).expect("valid id")
    }

    #[tokio::test]
    async fn mark_read_updates_own_unread_notification() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(notification(user(), false))));
        repo.expect_mark_read().times(1).return_once(|_| Ok(true));
        let service = NotificationService::new(Arc::new(repo));

        service.mark_read(id(), user()).await.expect("marked");
    }

    #[tokio::test]
    async fn mark_read_is_a_no_op_when_already_read() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(notification(user(), true))));
        repo.expect_mark_read().times(0);
        let service = NotificationService::new(Arc::new(repo));

        service.mark_read(id(), user()).await.expect("already read");
    }

    #[rstest]
    #[case::other_user(Recipient::user(UserId::new(2).expect("valid id")))]
    #[case::manager_with_same_id(Recipient::manager(ManagerId::new(1).expect("valid id")))]
    #[tokio::test]
    async fn mark_read_rejects_other_recipients(#[case] caller: Recipient) {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(notification(user(), false))));
        repo.expect_mark_read().times(0);
        let service = NotificationService::new(Arc::new(repo));

        let error = service.mark_read(id(), caller).await.expect_err("forbidden");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn mark_read_reports_unknown_id() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        let service = NotificationService::new(Arc::new(repo));

        let error = service.mark_read(id(), user()).await.expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn unread_count_maps_connection_failures() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_count_unread()
            .return_once(|_| Err(NotificationRepositoryError::connection("pool closed")));
        let service = NotificationService::new(Arc::new(repo));

        let error = service.unread_count(user()).await.expect_err("unavailable");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn mark_all_read_returns_updated_count() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_mark_all_read()
            .withf(|recipient: &Recipient| *recipient == user())
            .return_once(|_| Ok(3));
        let service = NotificationService::new(Arc::new(repo));

        assert_eq!(service.mark_all_read(user()).await.expect("marked"), 3);
    }
}

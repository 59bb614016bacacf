//! Post-commit status change notifications.
//!
//! [`NotificationDispatcher`] turns a committed transition into one message
//! for the user and one for the brand manager. [`SpawningNotifier`] moves any
//! notifier off the request path onto its own Tokio task.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join;
use mockable::Clock;
use tracing::{debug, error, warn};

use crate::domain::notification_templates::{manager_message, user_message};
use crate::domain::ports::{NotificationRepository, StatusChangeNotifier};
use crate::domain::{ConsultationDetails, NewNotification, Recipient};

/// Writes status change messages to the notification store.
///
/// Both writes are attempted even if one fails. Failures are logged and
/// never reported to the caller.
#[derive(Clone)]
pub struct NotificationDispatcher<N> {
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<N> NotificationDispatcher<N> {
    /// Create a dispatcher writing to `notifications`.
    pub fn new(notifications: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }
}

impl<N: NotificationRepository> NotificationDispatcher<N> {
    async fn deliver(&self, notification: NewNotification) {
        let recipient = notification.recipient;
        let consultation_id = notification.consultation_id;
        match self.notifications.create(&notification).await {
            Ok(stored) => debug!(
                notification_id = %stored.id,
                recipient = %recipient,
                consultation_id = %consultation_id,
                "notification stored"
            ),
            Err(err) => error!(
                recipient = %recipient,
                consultation_id = %consultation_id,
                error = %err,
                "failed to store status change notification"
            ),
        }
    }
}

#[async_trait]
impl<N: NotificationRepository> StatusChangeNotifier for NotificationDispatcher<N> {
    async fn notify_status_change(&self, change: ConsultationDetails) {
        let ConsultationDetails {
            consultation,
            user,
            brand,
        } = change;
        let consultation_id = consultation.id();

        let (Some(user), Some(brand)) = (user, brand) else {
            warn!(
                consultation_id = %consultation_id,
                "skipping notification: user or brand unresolved"
            );
            return;
        };
        let Some(manager_id) = brand.manager_id else {
            warn!(
                consultation_id = %consultation_id,
                brand_id = %brand.id,
                "skipping notification: brand has no manager"
            );
            return;
        };

        let status = consultation.status();
        let created_at = self.clock.utc();
        let to_user = NewNotification {
            recipient: Recipient::user(user.id),
            consultation_id,
            status,
            message: user_message(status, &brand.name),
            created_at,
        };
        let to_manager = NewNotification {
            recipient: Recipient::manager(manager_id),
            consultation_id,
            status,
            message: manager_message(status, &user.name),
            created_at,
        };

        join(self.deliver(to_user), self.deliver(to_manager)).await;
    }
}

/// Runs the wrapped notifier on a spawned task and returns immediately.
///
/// A panic inside the wrapped notifier surfaces as a join error on a
/// supervising task, where it is logged.
#[derive(Clone)]
pub struct SpawningNotifier {
    inner: Arc<dyn StatusChangeNotifier>,
}

impl SpawningNotifier {
    /// Wrap `inner`. Must be used from within a Tokio runtime.
    pub fn new(inner: Arc<dyn StatusChangeNotifier>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StatusChangeNotifier for SpawningNotifier {
    async fn notify_status_change(&self, change: ConsultationDetails) {
        let inner = Arc::clone(&self.inner);
        let consultation_id = change.consultation.id();
        let task = tokio::spawn(async move { inner.notify_status_change(change).await });
        tokio::spawn(async move {
            if let Err(err) = task.await {
                error!(
                    consultation_id = %consultation_id,
                    error = %err,
                    "status change notification task failed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
    use rstest::rstest;
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::ports::{MockNotificationRepository, NotificationRepositoryError};
    use crate::domain::{
        BrandId, BrandSummary, ConsultationId, ConsultationStatus, ManagerId, NewConsultation,
        NotificationId, RecipientRole, UserId, UserSummary,
    };

    struct FixtureClock;

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 1, 2, 9, 30, 0)
                .single()
                .expect("valid timestamp")
        }
    }

    fn details(manager_id: Option<i64>) -> ConsultationDetails {
        let consultation = NewConsultation {
            user_id: UserId::new(1).expect("valid id"),
            brand_id: BrandId::new(10).expect("valid id"),
            preferred_date: NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date"),
            preferred_time: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
            created_at: FixtureClock.utc(),
        }
        .into_consultation(ConsultationId::new(100).expect("valid id"));
        ConsultationDetails {
            consultation,
            user: Some(UserSummary {
                id: UserId::new(1).expect("valid id"),
                name: "Dana".to_owned(),
                email: None,
                phone: None,
            }),
            brand: Some(BrandSummary {
                id: BrandId::new(10).expect("valid id"),
                name: "Blue Bottle".to_owned(),
                category_name: None,
                manager_id: manager_id.map(|id| ManagerId::new(id).expect("valid id")),
            }),
        }
    }

    fn dispatcher(repo: MockNotificationRepository) -> NotificationDispatcher<MockNotificationRepository> {
        NotificationDispatcher::new(Arc::new(repo), Arc::new(FixtureClock))
    }

    fn stored(notification: &NewNotification) -> crate::domain::Notification {
        notification
            .clone()
            .into_notification(NotificationId::new(1).expect("valid id"))
    }

    #[tokio::test]
    async fn writes_one_message_per_party() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create()
            .withf(|n: &NewNotification| {
                n.recipient.role() == RecipientRole::User
                    && n.recipient.id() == 1
                    && n.message
                        == "[Blue Bottle] Your consultation request was received and is awaiting confirmation by the brand."
            })
            .times(1)
            .returning(|n| Ok(stored(n)));
        repo.expect_create()
            .withf(|n: &NewNotification| {
                n.recipient.role() == RecipientRole::Manager
                    && n.recipient.id() == 99
                    && n.message == "[Dana] A new consultation request is waiting for your confirmation."
                    && n.status == ConsultationStatus::Pending
            })
            .times(1)
            .returning(|n| Ok(stored(n)));

        dispatcher(repo).notify_status_change(details(Some(99))).await;
    }

    #[tokio::test]
    async fn failed_user_write_still_attempts_manager_write() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create()
            .withf(|n: &NewNotification| n.recipient.role() == RecipientRole::User)
            .times(1)
            .returning(|_| Err(NotificationRepositoryError::connection("sink offline")));
        repo.expect_create()
            .withf(|n: &NewNotification| n.recipient.role() == RecipientRole::Manager)
            .times(1)
            .returning(|n| Ok(stored(n)));

        dispatcher(repo).notify_status_change(details(Some(99))).await;
    }

    #[rstest]
    #[case::no_manager(details(None))]
    #[case::no_user(ConsultationDetails { user: None, ..details(Some(99)) })]
    #[case::no_brand(ConsultationDetails { brand: None, ..details(Some(99)) })]
    #[tokio::test]
    async fn partial_details_are_skipped(#[case] change: ConsultationDetails) {
        let mut repo = MockNotificationRepository::new();
        repo.expect_create().times(0);

        dispatcher(repo).notify_status_change(change).await;
    }

    struct ChannelNotifier(mpsc::UnboundedSender<ConsultationId>);

    #[async_trait]
    impl StatusChangeNotifier for ChannelNotifier {
        async fn notify_status_change(&self, change: ConsultationDetails) {
            let _ = self.0.send(change.consultation.id());
        }
    }

    /// Panics on its first call, reports every later one.
    struct FlakyNotifier {
        tripped: AtomicBool,
        sender: mpsc::UnboundedSender<ConsultationId>,
    }

    #[async_trait]
    impl StatusChangeNotifier for FlakyNotifier {
        async fn notify_status_change(&self, change: ConsultationDetails) {
            if !self.tripped.swap(true, Ordering::SeqCst) {
                panic!("notifier blew up");
            }
            let _ = self.sender.send(change.consultation.id());
        }
    }

    #[tokio::test]
    async fn spawning_notifier_runs_inner_notifier_in_background() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let notifier = SpawningNotifier::new(Arc::new(ChannelNotifier(sender)));

        notifier.notify_status_change(details(Some(99))).await;

        let received = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("notification delivered in time");
        assert_eq!(received, Some(ConsultationId::new(100).expect("valid id")));
    }

    #[tokio::test]
    async fn spawning_notifier_survives_a_panicking_delivery() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let flaky = Arc::new(FlakyNotifier {
            tripped: AtomicBool::new(false),
            sender,
        });
        let notifier = SpawningNotifier::new(flaky.clone());

        notifier.notify_status_change(details(Some(99))).await;
        tokio::time::timeout(Duration::from_secs(1), async {
            while !flaky.tripped.load(Ordering::SeqCst) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("first delivery ran");

        notifier.notify_status_change(details(Some(99))).await;
        let received = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .expect("follow-up delivered in time");
        assert_eq!(received, Some(ConsultationId::new(100).expect("valid id")));
        assert!(
            receiver.try_recv().is_err(),
            "the panicking delivery sends nothing"
        );
    }
}

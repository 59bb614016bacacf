//! Port invoked after a consultation transition has been committed.
//!
//! Implementations are best-effort: the signature has no error channel, so a
//! notifier cannot fail the operation that triggered it.

use async_trait::async_trait;

use crate::domain::ConsultationDetails;

/// Reacts to a committed consultation status change.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusChangeNotifier: Send + Sync {
    /// Announce the consultation's new status to the parties involved.
    async fn notify_status_change(&self, change: ConsultationDetails);
}

/// Notifier that drops every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStatusChangeNotifier;

#[async_trait]
impl StatusChangeNotifier for FixtureStatusChangeNotifier {
    async fn notify_status_change(&self, _change: ConsultationDetails) {}
}

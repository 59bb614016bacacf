//! Driving port for consultation listings.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{ConsultationDetails, Error, ManagerId, UserId};

/// Driving port for consultation read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultationQuery: Send + Sync {
    /// Page through a user's consultations, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<ConsultationDetails>, Error>;

    /// Page through consultations for every brand a manager manages.
    async fn list_for_manager(
        &self,
        manager_id: ManagerId,
        page: PageRequest,
    ) -> Result<Page<ConsultationDetails>, Error>;

    /// A user's consultations awaiting an answer to a reschedule proposal.
    async fn list_reschedule_requests(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConsultationDetails>, Error>;
}

/// Fixture query returning empty listings.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConsultationQuery;

#[async_trait]
impl ConsultationQuery for FixtureConsultationQuery {
    async fn list_for_user(
        &self,
        _user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<ConsultationDetails>, Error> {
        Ok(Page::empty(page))
    }

    async fn list_for_manager(
        &self,
        _manager_id: ManagerId,
        page: PageRequest,
    ) -> Result<Page<ConsultationDetails>, Error> {
        Ok(Page::empty(page))
    }

    async fn list_reschedule_requests(
        &self,
        _user_id: UserId,
    ) -> Result<Vec<ConsultationDetails>, Error> {
        Ok(Vec::new())
    }
}

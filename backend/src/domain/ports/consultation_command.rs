//! Driving port for consultation lifecycle mutations.
//!
//! Each operation identifies its caller explicitly; identity has already been
//! resolved by the inbound adapter.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::domain::{
    Actor, BrandId, ConsultationDetails, ConsultationId, Error, ManagerId, RescheduleProposal,
    UserId, UserResponse,
};

/// Request a consultation with a brand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateConsultationRequest {
    pub user_id: UserId,
    pub brand_id: BrandId,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
}

/// Manager proposes a new date and time for a pending consultation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposeRescheduleRequest {
    pub consultation_id: ConsultationId,
    pub manager_id: ManagerId,
    pub proposal: RescheduleProposal,
}

/// Manager confirms a pending consultation as requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmConsultationRequest {
    pub consultation_id: ConsultationId,
    pub manager_id: ManagerId,
}

/// User answers a reschedule proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespondToRescheduleRequest {
    pub consultation_id: ConsultationId,
    pub user_id: UserId,
    pub response: UserResponse,
}

/// Either party cancels a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelConsultationRequest {
    pub consultation_id: ConsultationId,
    pub actor: Actor,
}

/// Driving port for consultation write operations.
///
/// Failures use [`Error`] codes: `NotFound` for unknown consultations, users
/// or brands; `Forbidden` when the caller does not own the consultation;
/// `InvalidTransition` when the status does not permit the operation;
/// `DuplicateActiveConsultation` when `create` would give a user a second
/// active consultation with the same brand.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultationCommand: Send + Sync {
    /// Request a new consultation; it starts `PENDING`.
    async fn create(
        &self,
        request: CreateConsultationRequest,
    ) -> Result<ConsultationDetails, Error>;

    /// Move a `PENDING` consultation to `RESCHEDULE_REQUEST`.
    async fn propose_reschedule(
        &self,
        request: ProposeRescheduleRequest,
    ) -> Result<ConsultationDetails, Error>;

    /// Confirm a `PENDING` consultation.
    async fn confirm(
        &self,
        request: ConfirmConsultationRequest,
    ) -> Result<ConsultationDetails, Error>;

    /// Accept or reject a `RESCHEDULE_REQUEST`.
    async fn respond(
        &self,
        request: RespondToRescheduleRequest,
    ) -> Result<ConsultationDetails, Error>;

    /// Cancel a consultation that has not already ended.
    async fn cancel(&self, request: CancelConsultationRequest) -> Result<(), Error>;
}

/// Fixture command that owns no consultations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConsultationCommand;

fn fixture_not_found(consultation_id: ConsultationId) -> Error {
    Error::not_found(format!("consultation {consultation_id} not found"))
}

#[async_trait]
impl ConsultationCommand for FixtureConsultationCommand {
    async fn create(
        &self,
        request: CreateConsultationRequest,
    ) -> Result<ConsultationDetails, Error> {
        Err(Error::not_found(format!(
            "brand {} not found",
            request.brand_id
        )))
    }

    async fn propose_reschedule(
        &self,
        request: ProposeRescheduleRequest,
    ) -> Result<ConsultationDetails, Error> {
        Err(fixture_not_found(request.consultation_id))
    }

    async fn confirm(
        &self,
        request: ConfirmConsultationRequest,
    ) -> Result<ConsultationDetails, Error> {
        Err(fixture_not_found(request.consultation_id))
    }

    async fn respond(
        &self,
        request: RespondToRescheduleRequest,
    ) -> Result<ConsultationDetails, Error> {
        Err(fixture_not_found(request.consultation_id))
    }

    async fn cancel(&self, request: CancelConsultationRequest) -> Result<(), Error> {
        Err(fixture_not_found(request.consultation_id))
    }
}

//! Port for consultation persistence.
//!
//! The store owns the one-active-consultation guarantee: `insert` must refuse
//! a second consultation occupying the same (user, brand) slot atomically,
//! reporting [`ConsultationRepositoryError::DuplicateActive`].

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{BrandId, Consultation, ConsultationId, NewConsultation, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by consultation repository adapters.
    pub enum ConsultationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "consultation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "consultation repository query failed: {message}",
        /// Another active consultation already occupies the (user, brand) slot.
        DuplicateActive { user_id: i64, brand_id: i64 } =>
            "user {user_id} already holds an active consultation with brand {brand_id}",
        /// The stored revision moved on since the consultation was loaded.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "consultation revision mismatch: expected {expected}, found {actual}",
    }
}

/// Port for reading and writing consultations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    /// Find a consultation by id.
    async fn find_by_id(
        &self,
        consultation_id: &ConsultationId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError>;

    /// Find the consultation currently occupying the (user, brand) slot.
    async fn find_active_by_user_and_brand(
        &self,
        user_id: &UserId,
        brand_id: &BrandId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError>;

    /// Insert a new `PENDING` consultation and return it with its id.
    async fn insert(
        &self,
        consultation: &NewConsultation,
    ) -> Result<Consultation, ConsultationRepositoryError>;

    /// Persist a transitioned consultation if the stored revision still equals
    /// `expected_revision`.
    async fn update(
        &self,
        consultation: &Consultation,
        expected_revision: u32,
    ) -> Result<(), ConsultationRepositoryError>;

    /// Page through a user's consultations, newest first, cancelled included.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError>;

    /// Page through consultations for any of `brand_ids`, newest first.
    async fn list_for_brands(
        &self,
        brand_ids: &[BrandId],
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError>;

    /// A user's active consultations awaiting a reschedule answer, newest
    /// first.
    async fn list_reschedule_requests(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Consultation>, ConsultationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConsultationRepository;

#[async_trait]
impl ConsultationRepository for FixtureConsultationRepository {
    async fn find_by_id(
        &self,
        _consultation_id: &ConsultationId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError> {
        Ok(None)
    }

    async fn find_active_by_user_and_brand(
        &self,
        _user_id: &UserId,
        _brand_id: &BrandId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError> {
        Ok(None)
    }

    async fn insert(
        &self,
        consultation: &NewConsultation,
    ) -> Result<Consultation, ConsultationRepositoryError> {
        let id = ConsultationId::new(1)
            .map_err(|err| ConsultationRepositoryError::query(err.to_string()))?;
        Ok(consultation.clone().into_consultation(id))
    }

    async fn update(
        &self,
        _consultation: &Consultation,
        _expected_revision: u32,
    ) -> Result<(), ConsultationRepositoryError> {
        Ok(())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError> {
        Ok(Page::empty(page))
    }

    async fn list_for_brands(
        &self,
        _brand_ids: &[BrandId],
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError> {
        Ok(Page::empty(page))
    }

    async fn list_reschedule_requests(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Consultation>, ConsultationRepositoryError> {
        Ok(Vec::new())
    }
}

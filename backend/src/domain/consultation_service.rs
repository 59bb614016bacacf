//! Consultation lifecycle service implementing the consultation driving
//! ports.
//!
//! Every transition follows the same sequence: load the consultation, check
//! the caller owns it, apply the transition table, then persist against the
//! revision that was loaded. Notification happens only after the write has
//! committed and can never fail the operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    BrandDirectory, BrandDirectoryError, CancelConsultationRequest, ConfirmConsultationRequest,
    ConsultationCommand, ConsultationQuery, ConsultationRepository, ConsultationRepositoryError,
    CreateConsultationRequest, ProposeRescheduleRequest, RespondToRescheduleRequest,
    StatusChangeNotifier, UserDirectory, UserDirectoryError,
};
use crate::domain::{
    Actor, BrandId, BrandSummary, Consultation, ConsultationDetails, ConsultationId,
    ConsultationStatus, Error, ManagerId, NewConsultation, UserId, UserSummary,
};

/// Consultation service implementing [`ConsultationCommand`] and
/// [`ConsultationQuery`].
#[derive(Clone)]
pub struct ConsultationLifecycleService<R, U, B> {
    consultations: Arc<R>,
    users: Arc<U>,
    brands: Arc<B>,
    notifier: Arc<dyn StatusChangeNotifier>,
    clock: Arc<dyn Clock>,
}

impl<R, U, B> ConsultationLifecycleService<R, U, B> {
    /// Create a service over the consultation store and both directories.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use consult_backend::domain::ConsultationLifecycleService;
    /// # use consult_backend::domain::ports::{
    /// #     FixtureBrandDirectory, FixtureConsultationRepository, FixtureStatusChangeNotifier,
    /// #     FixtureUserDirectory,
    /// # };
    /// # use mockable::DefaultClock;
    /// let service = ConsultationLifecycleService::new(
    ///     Arc::new(FixtureConsultationRepository),
    ///     Arc::new(FixtureUserDirectory),
    ///     Arc::new(FixtureBrandDirectory),
    ///     Arc::new(FixtureStatusChangeNotifier),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        consultations: Arc<R>,
        users: Arc<U>,
        brands: Arc<B>,
        notifier: Arc<dyn StatusChangeNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            consultations,
            users,
            brands,
            notifier,
            clock,
        }
    }
}

fn map_consultation_error(error: ConsultationRepositoryError) -> Error {
    match error {
        ConsultationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("consultation repository unavailable: {message}"))
        }
        ConsultationRepositoryError::Query { message } => {
            Error::internal(format!("consultation repository error: {message}"))
        }
        ConsultationRepositoryError::DuplicateActive { .. } => {
            Error::duplicate_active_consultation(ConsultationStatus::Pending)
        }
        ConsultationRepositoryError::RevisionMismatch { expected, actual } => {
            Error::conflict("consultation was modified concurrently").with_details(json!({
                "expectedRevision": expected,
                "actualRevision": actual,
                "code": "revision_mismatch",
            }))
        }
    }
}

fn map_user_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
    }
}

fn map_brand_error(error: BrandDirectoryError) -> Error {
    match error {
        BrandDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("brand directory unavailable: {message}"))
        }
        BrandDirectoryError::Query { message } => {
            Error::internal(format!("brand directory error: {message}"))
        }
    }
}

fn not_yours() -> Error {
    Error::forbidden("not your consultation")
}

impl<R, U, B> ConsultationLifecycleService<R, U, B>
where
    R: ConsultationRepository,
    U: UserDirectory,
    B: BrandDirectory,
{
    async fn find_user(&self, user_id: UserId) -> Result<Option<UserSummary>, Error> {
        self.users.find_user(&user_id).await.map_err(map_user_error)
    }

    async fn find_brand(&self, brand_id: BrandId) -> Result<Option<BrandSummary>, Error> {
        self.brands.find_brand(&brand_id).await.map_err(map_brand_error)
    }

    async fn load(&self, consultation_id: ConsultationId) -> Result<Consultation, Error> {
        self.consultations
            .find_by_id(&consultation_id)
            .await
            .map_err(map_consultation_error)?
            .ok_or_else(|| Error::not_found(format!("consultation {consultation_id} not found")))
    }

    fn require_user(consultation: &Consultation, user_id: UserId) -> Result<(), Error> {
        if consultation.is_requested_by(user_id) {
            Ok(())
        } else {
            Err(not_yours())
        }
    }

    /// Resolve the consultation's brand and check `manager_id` manages it.
    async fn require_manager(
        &self,
        consultation: &Consultation,
        manager_id: ManagerId,
    ) -> Result<BrandSummary, Error> {
        match self.find_brand(consultation.brand_id()).await? {
            Some(brand) if brand.is_managed_by(manager_id) => Ok(brand),
            _ => Err(not_yours()),
        }
    }

    /// Status of whichever consultation won a duplicate-slot race.
    async fn duplicate_winner(&self, user_id: UserId, brand_id: BrandId) -> Error {
        let status = match self
            .consultations
            .find_active_by_user_and_brand(&user_id, &brand_id)
            .await
        {
            Ok(Some(winner)) => winner.status(),
            Ok(None) => ConsultationStatus::Pending,
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    brand_id = %brand_id,
                    error = %err,
                    "failed to read the active consultation after a duplicate insert"
                );
                ConsultationStatus::Pending
            }
        };
        Error::duplicate_active_consultation(status)
    }

    /// Fill in directory summaries once a write has committed.
    ///
    /// Lookup failures here are logged and leave the summary empty; the
    /// transition is already durable.
    async fn committed_details(
        &self,
        consultation: Consultation,
        user: Option<UserSummary>,
        brand: Option<BrandSummary>,
    ) -> ConsultationDetails {
        let user = match user {
            Some(user) => Some(user),
            None => self
                .find_user(consultation.user_id())
                .await
                .unwrap_or_else(|err| {
                    warn!(
                        consultation_id = %consultation.id(),
                        user_id = %consultation.user_id(),
                        error = %err,
                        "user lookup failed after commit"
                    );
                    None
                }),
        };
        let brand = match brand {
            Some(brand) => Some(brand),
            None => self
                .find_brand(consultation.brand_id())
                .await
                .unwrap_or_else(|err| {
                    warn!(
                        consultation_id = %consultation.id(),
                        brand_id = %consultation.brand_id(),
                        error = %err,
                        "brand lookup failed after commit"
                    );
                    None
                }),
        };
        ConsultationDetails {
            consultation,
            user,
            brand,
        }
    }

    async fn commit(
        &self,
        consultation: Consultation,
        expected_revision: u32,
        user: Option<UserSummary>,
        brand: Option<BrandSummary>,
    ) -> Result<ConsultationDetails, Error> {
        self.consultations
            .update(&consultation, expected_revision)
            .await
            .map_err(map_consultation_error)?;
        info!(
            consultation_id = %consultation.id(),
            status = %consultation.status(),
            revision = consultation.revision(),
            "consultation transition committed"
        );

        let details = self.committed_details(consultation, user, brand).await;
        self.notifier.notify_status_change(details.clone()).await;
        Ok(details)
    }

    /// Attach directory summaries to a batch of consultations, looking each
    /// user and brand up once.
    async fn hydrate(
        &self,
        consultations: Vec<Consultation>,
    ) -> Result<Vec<ConsultationDetails>, Error> {
        let mut users: HashMap<UserId, Option<UserSummary>> = HashMap::new();
        let mut brands: HashMap<BrandId, Option<BrandSummary>> = HashMap::new();
        let mut details = Vec::with_capacity(consultations.len());

        for consultation in consultations {
            let user_id = consultation.user_id();
            if !users.contains_key(&user_id) {
                users.insert(user_id, self.find_user(user_id).await?);
            }
            let brand_id = consultation.brand_id();
            if !brands.contains_key(&brand_id) {
                brands.insert(brand_id, self.find_brand(brand_id).await?);
            }
            details.push(ConsultationDetails {
                user: users.get(&user_id).cloned().flatten(),
                brand: brands.get(&brand_id).cloned().flatten(),
                consultation,
            });
        }
        Ok(details)
    }

    async fn hydrate_page(
        &self,
        page: Page<Consultation>,
    ) -> Result<Page<ConsultationDetails>, Error> {
        let request = page.request();
        let total = page.total_elements();
        let items = self.hydrate(page.into_items()).await?;
        Ok(Page::new(items, request, total))
    }
}

#[async_trait]
impl<R, U, B> ConsultationCommand for ConsultationLifecycleService<R, U, B>
where
    R: ConsultationRepository,
    U: UserDirectory,
    B: BrandDirectory,
{
    async fn create(
        &self,
        request: CreateConsultationRequest,
    ) -> Result<ConsultationDetails, Error> {
        let CreateConsultationRequest {
            user_id,
            brand_id,
            preferred_date,
            preferred_time,
        } = request;

        if let Some(existing) = self
            .consultations
            .find_active_by_user_and_brand(&user_id, &brand_id)
            .await
            .map_err(map_consultation_error)?
        {
            return Err(Error::duplicate_active_consultation(existing.status()));
        }

        let user = self
            .find_user(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        let brand = self
            .find_brand(brand_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("brand {brand_id} not found")))?;

        let new_consultation = NewConsultation {
            user_id,
            brand_id,
            preferred_date,
            preferred_time,
            created_at: self.clock.utc(),
        };
        let consultation = match self.consultations.insert(&new_consultation).await {
            Ok(consultation) => consultation,
            Err(ConsultationRepositoryError::DuplicateActive { .. }) => {
                return Err(self.duplicate_winner(user_id, brand_id).await);
            }
            Err(err) => return Err(map_consultation_error(err)),
        };
        info!(
            consultation_id = %consultation.id(),
            user_id = %user_id,
            brand_id = %brand_id,
            "consultation requested"
        );

        let details = ConsultationDetails {
            consultation,
            user: Some(user),
            brand: Some(brand),
        };
        self.notifier.notify_status_change(details.clone()).await;
        Ok(details)
    }

    async fn propose_reschedule(
        &self,
        request: ProposeRescheduleRequest,
    ) -> Result<ConsultationDetails, Error> {
        let mut consultation = self.load(request.consultation_id).await?;
        let brand = self
            .require_manager(&consultation, request.manager_id)
            .await?;
        let expected_revision = consultation.revision();
        consultation.propose_reschedule(request.proposal, self.clock.utc())?;
        self.commit(consultation, expected_revision, None, Some(brand))
            .await
    }

    async fn confirm(
        &self,
        request: ConfirmConsultationRequest,
    ) -> Result<ConsultationDetails, Error> {
        let mut consultation = self.load(request.consultation_id).await?;
        let brand = self
            .require_manager(&consultation, request.manager_id)
            .await?;
        let expected_revision = consultation.revision();
        consultation.confirm(self.clock.utc())?;
        self.commit(consultation, expected_revision, None, Some(brand))
            .await
    }

    async fn respond(
        &self,
        request: RespondToRescheduleRequest,
    ) -> Result<ConsultationDetails, Error> {
        let mut consultation = self.load(request.consultation_id).await?;
        Self::require_user(&consultation, request.user_id)?;
        let expected_revision = consultation.revision();
        consultation.respond(request.response, self.clock.utc())?;
        self.commit(consultation, expected_revision, None, None)
            .await
    }

    async fn cancel(&self, request: CancelConsultationRequest) -> Result<(), Error> {
        let mut consultation = self.load(request.consultation_id).await?;
        let brand = match request.actor {
            Actor::User(user_id) => {
                Self::require_user(&consultation, user_id)?;
                None
            }
            Actor::Manager(manager_id) => {
                Some(self.require_manager(&consultation, manager_id).await?)
            }
        };
        let expected_revision = consultation.revision();
        debug!(
            consultation_id = %consultation.id(),
            actor = request.actor.role_name(),
            actor_id = request.actor.raw_id(),
            "cancelling consultation"
        );
        consultation.cancel()?;
        self.commit(consultation, expected_revision, None, brand)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl<R, U, B> ConsultationQuery for ConsultationLifecycleService<R, U, B>
where
    R: ConsultationRepository,
    U: UserDirectory,
    B: BrandDirectory,
{
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<ConsultationDetails>, Error> {
        let consultations = self
            .consultations
            .list_for_user(&user_id, page)
            .await
            .map_err(map_consultation_error)?;
        self.hydrate_page(consultations).await
    }

    async fn list_for_manager(
        &self,
        manager_id: ManagerId,
        page: PageRequest,
    ) -> Result<Page<ConsultationDetails>, Error> {
        let brand_ids = self
            .brands
            .brands_managed_by(&manager_id)
            .await
            .map_err(map_brand_error)?;
        if brand_ids.is_empty() {
            return Ok(Page::empty(page));
        }
        let consultations = self
            .consultations
            .list_for_brands(&brand_ids, page)
            .await
            .map_err(map_consultation_error)?;
        self.hydrate_page(consultations).await
    }

    async fn list_reschedule_requests(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ConsultationDetails>, Error> {
        let consultations = self
            .consultations
            .list_reschedule_requests(&user_id)
            .await
            .map_err(map_consultation_error)?;
        self.hydrate(consultations).await
    }
}

#[cfg(test)]
#[path = "consultation_service_tests.rs"]
mod tests;

//! Consultation aggregate and its lifecycle state machine.
//!
//! A consultation is created `PENDING` and only moves through the transitions
//! listed in [`ConsultationStatus::apply`]. Transition methods mutate the
//! aggregate in place and bump its revision; persisting the result and
//! authorising the caller are the lifecycle service's job.

mod status;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BrandId, BrandSummary, ConsultationId, Error, ManagerId, UserId, UserSummary};

pub use self::status::{
    ConsultationAction, ConsultationStatus, StatusCatalog, StatusEntry, UnknownStatusCode,
};

/// The user's answer to a reschedule proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserResponse {
    /// Take the proposed date and time.
    Accept,
    /// Decline the proposal, cancelling the consultation.
    Reject,
}

impl UserResponse {
    /// Stable upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
        }
    }

    const fn action(self) -> ConsultationAction {
        match self {
            Self::Accept => ConsultationAction::Accept,
            Self::Reject => ConsultationAction::Reject,
        }
    }
}

impl fmt::Display for UserResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown user response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user response must be ACCEPT or REJECT, got {0:?}")]
pub struct ParseUserResponseError(String);

impl FromStr for UserResponse {
    type Err = ParseUserResponseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ACCEPT" => Ok(Self::Accept),
            "REJECT" => Ok(Self::Reject),
            _ => Err(ParseUserResponseError(raw.to_owned())),
        }
    }
}

/// The party invoking an operation, with its resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    /// The end user who requested the consultation.
    User(UserId),
    /// The manager of the consultation's brand.
    Manager(ManagerId),
}

impl Actor {
    /// Role name as recorded in logs and notifications.
    pub const fn role_name(self) -> &'static str {
        match self {
            Self::User(_) => "USER",
            Self::Manager(_) => "MANAGER",
        }
    }

    /// Raw identifier of the actor.
    pub const fn raw_id(self) -> i64 {
        match self {
            Self::User(id) => id.get(),
            Self::Manager(id) => id.get(),
        }
    }
}

/// A manager's proposed replacement date and time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleProposal {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: Option<String>,
    /// Replaces the consultation's manager note when present.
    pub manager_note: Option<String>,
}

/// Raised when an operation is not permitted from the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {} a consultation in status {from}", .action.describe())]
pub struct TransitionError {
    pub from: ConsultationStatus,
    pub action: ConsultationAction,
}

impl From<TransitionError> for Error {
    fn from(err: TransitionError) -> Self {
        Self::invalid_transition(err.from, err.to_string())
    }
}

/// Validation errors raised when restoring a persisted consultation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsultationValidationError {
    #[error("consultation {id} is cancelled but still flagged active")]
    CancelledButActive { id: ConsultationId },
    #[error("consultation {id} is open in status {status} but flagged inactive")]
    OpenButInactive {
        id: ConsultationId,
        status: ConsultationStatus,
    },
    #[error("consultation {id} awaits a reschedule answer without an adjusted date and time")]
    MissingAdjustment { id: ConsultationId },
    #[error("consultation {id} has revision 0; revisions start at 1")]
    ZeroRevision { id: ConsultationId },
}

/// Input for [`Consultation::restore`]: every persisted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationDraft {
    pub id: ConsultationId,
    pub user_id: UserId,
    pub brand_id: BrandId,
    pub status: ConsultationStatus,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub manager_note: Option<String>,
    pub adjusted_date: Option<NaiveDate>,
    pub adjusted_time: Option<NaiveTime>,
    pub adjustment_reason: Option<String>,
    pub adjustment_requested_at: Option<DateTime<Utc>>,
    pub user_response: Option<UserResponse>,
    pub user_response_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub revision: u32,
}

/// Payload for inserting a freshly requested consultation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConsultation {
    pub user_id: UserId,
    pub brand_id: BrandId,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl NewConsultation {
    /// Materialise the consultation once the store has assigned an id.
    pub fn into_consultation(self, id: ConsultationId) -> Consultation {
        Consultation {
            id,
            user_id: self.user_id,
            brand_id: self.brand_id,
            status: ConsultationStatus::Pending,
            preferred_date: self.preferred_date,
            preferred_time: self.preferred_time,
            manager_note: None,
            adjusted_date: None,
            adjusted_time: None,
            adjustment_reason: None,
            adjustment_requested_at: None,
            user_response: None,
            user_response_at: None,
            created_at: self.created_at,
            confirmed_at: None,
            is_active: true,
            revision: 1,
        }
    }
}

/// A consultation request between a user and a brand.
///
/// ## Invariants
/// - A `CANCELLED` consultation is never active; `PENDING`,
///   `RESCHEDULE_REQUEST` and `CONFIRMED` consultations always are.
/// - In `RESCHEDULE_REQUEST` the adjusted date and time are present.
/// - `revision` starts at 1 and grows by one per applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consultation {
    id: ConsultationId,
    user_id: UserId,
    brand_id: BrandId,
    status: ConsultationStatus,
    preferred_date: NaiveDate,
    preferred_time: NaiveTime,
    manager_note: Option<String>,
    adjusted_date: Option<NaiveDate>,
    adjusted_time: Option<NaiveTime>,
    adjustment_reason: Option<String>,
    adjustment_requested_at: Option<DateTime<Utc>>,
    user_response: Option<UserResponse>,
    user_response_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    confirmed_at: Option<DateTime<Utc>>,
    is_active: bool,
    revision: u32,
}

impl Consultation {
    /// Rebuild a persisted consultation, rejecting inconsistent snapshots.
    pub fn restore(draft: ConsultationDraft) -> Result<Self, ConsultationValidationError> {
        let ConsultationDraft {
            id,
            user_id,
            brand_id,
            status,
            preferred_date,
            preferred_time,
            manager_note,
            adjusted_date,
            adjusted_time,
            adjustment_reason,
            adjustment_requested_at,
            user_response,
            user_response_at,
            created_at,
            confirmed_at,
            is_active,
            revision,
        } = draft;

        if status == ConsultationStatus::Cancelled && is_active {
            return Err(ConsultationValidationError::CancelledButActive { id });
        }
        if status.is_occupying() && !is_active {
            return Err(ConsultationValidationError::OpenButInactive { id, status });
        }
        if status == ConsultationStatus::RescheduleRequest
            && (adjusted_date.is_none() || adjusted_time.is_none())
        {
            return Err(ConsultationValidationError::MissingAdjustment { id });
        }
        if revision == 0 {
            return Err(ConsultationValidationError::ZeroRevision { id });
        }

        Ok(Self {
            id,
            user_id,
            brand_id,
            status,
            preferred_date,
            preferred_time,
            manager_note,
            adjusted_date,
            adjusted_time,
            adjustment_reason,
            adjustment_requested_at,
            user_response,
            user_response_at,
            created_at,
            confirmed_at,
            is_active,
            revision,
        })
    }

    pub fn id(&self) -> ConsultationId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn brand_id(&self) -> BrandId {
        self.brand_id
    }

    pub fn status(&self) -> ConsultationStatus {
        self.status
    }

    /// Date the consultation currently targets.
    pub fn preferred_date(&self) -> NaiveDate {
        self.preferred_date
    }

    /// Time the consultation currently targets.
    pub fn preferred_time(&self) -> NaiveTime {
        self.preferred_time
    }

    pub fn manager_note(&self) -> Option<&str> {
        self.manager_note.as_deref()
    }

    /// Date of the latest reschedule proposal. Only meaningful while the
    /// status is `RESCHEDULE_REQUEST`.
    pub fn adjusted_date(&self) -> Option<NaiveDate> {
        self.adjusted_date
    }

    pub fn adjusted_time(&self) -> Option<NaiveTime> {
        self.adjusted_time
    }

    pub fn adjustment_reason(&self) -> Option<&str> {
        self.adjustment_reason.as_deref()
    }

    pub fn adjustment_requested_at(&self) -> Option<DateTime<Utc>> {
        self.adjustment_requested_at
    }

    pub fn user_response(&self) -> Option<UserResponse> {
        self.user_response
    }

    pub fn user_response_at(&self) -> Option<DateTime<Utc>> {
        self.user_response_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        self.confirmed_at
    }

    /// Whether the consultation still counts towards the one-active limit.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Optimistic concurrency revision.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Whether `user_id` requested this consultation.
    pub fn is_requested_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Whether this consultation occupies the user's slot with its brand.
    pub fn occupies_slot(&self) -> bool {
        self.is_active && self.status.is_occupying()
    }

    /// Move a `PENDING` consultation to `RESCHEDULE_REQUEST`.
    pub fn propose_reschedule(
        &mut self,
        proposal: RescheduleProposal,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        let next = self.next_status(ConsultationAction::ProposeReschedule)?;
        let RescheduleProposal {
            date,
            time,
            reason,
            manager_note,
        } = proposal;

        self.adjusted_date = Some(date);
        self.adjusted_time = Some(time);
        self.adjustment_reason = reason;
        self.adjustment_requested_at = Some(now);
        if manager_note.is_some() {
            self.manager_note = manager_note;
        }
        self.advance(next);
        Ok(())
    }

    /// Confirm a `PENDING` consultation at its preferred date and time.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), TransitionError> {
        let next = self.next_status(ConsultationAction::Confirm)?;
        self.confirmed_at = Some(now);
        self.advance(next);
        Ok(())
    }

    /// Record the user's answer to a reschedule proposal.
    ///
    /// Accepting copies the adjusted date and time over the preferred ones
    /// and confirms; rejecting cancels and frees the slot.
    pub fn respond(
        &mut self,
        response: UserResponse,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        let next = self.next_status(response.action())?;
        self.user_response = Some(response);
        self.user_response_at = Some(now);

        match response {
            UserResponse::Accept => {
                if let (Some(date), Some(time)) = (self.adjusted_date, self.adjusted_time) {
                    self.preferred_date = date;
                    self.preferred_time = time;
                }
                self.confirmed_at = Some(now);
            }
            UserResponse::Reject => self.is_active = false,
        }
        self.advance(next);
        Ok(())
    }

    /// Cancel an open consultation.
    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        let next = self.next_status(ConsultationAction::Cancel)?;
        self.is_active = false;
        self.advance(next);
        Ok(())
    }

    fn next_status(&self, action: ConsultationAction) -> Result<ConsultationStatus, TransitionError> {
        self.status.apply(action).ok_or(TransitionError {
            from: self.status,
            action,
        })
    }

    fn advance(&mut self, next: ConsultationStatus) {
        self.status = next;
        self.revision = self.revision.saturating_add(1);
    }
}

/// A consultation with the directory records it references.
///
/// Summaries are `None` when the directory no longer knows the id or could
/// not be reached after the transition committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultationDetails {
    pub consultation: Consultation,
    pub user: Option<UserSummary>,
    pub brand: Option<BrandSummary>,
}

impl ConsultationDetails {
    /// The manager owning the consultation's brand, when known.
    pub fn manager_id(&self) -> Option<ManagerId> {
        self.brand.as_ref().and_then(|brand| brand.manager_id)
    }
}

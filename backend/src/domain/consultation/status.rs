//! Consultation statuses, lifecycle actions and the transition table.
//!
//! Status codes are part of the persisted contract: the `consultation_status`
//! table is seeded with exactly the codes returned by
//! [`ConsultationStatus::code`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Error;

/// Lifecycle status of a consultation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsultationStatus {
    /// Newly requested, awaiting manager action.
    Pending,
    /// Manager proposed a new date and time, awaiting the user's answer.
    RescheduleRequest,
    /// Date and time are locked in.
    Confirmed,
    /// The consultation took place. No lifecycle operation produces this
    /// status; it is written by processes outside this service.
    Completed,
    /// Terminated by either party.
    Cancelled,
}

impl ConsultationStatus {
    /// Every status in code order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::RescheduleRequest,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Persisted numeric code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Pending => 1,
            Self::RescheduleRequest => 2,
            Self::Confirmed => 3,
            Self::Completed => 4,
            Self::Cancelled => 5,
        }
    }

    /// Stable upper-case name used in messages and payloads.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::RescheduleRequest => "RESCHEDULE_REQUEST",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Decode a persisted status code.
    pub fn from_code(code: i32) -> Result<Self, UnknownStatusCode> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(UnknownStatusCode { code })
    }

    /// Whether a consultation in this status holds the one-per-(user, brand)
    /// slot while it is active.
    pub const fn is_occupying(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::RescheduleRequest | Self::Confirmed
        )
    }

    /// Whether no lifecycle operation may leave this status.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Look up the status reached by applying `action`, or `None` when the
    /// transition is not permitted.
    ///
    /// # Examples
    /// ```
    /// use consult_backend::domain::{ConsultationAction, ConsultationStatus};
    ///
    /// assert_eq!(
    ///     ConsultationStatus::Pending.apply(ConsultationAction::Confirm),
    ///     Some(ConsultationStatus::Confirmed)
    /// );
    /// assert_eq!(
    ///     ConsultationStatus::RescheduleRequest.apply(ConsultationAction::Confirm),
    ///     None
    /// );
    /// ```
    pub const fn apply(self, action: ConsultationAction) -> Option<Self> {
        use ConsultationAction as A;

        match (self, action) {
            (Self::Pending, A::ProposeReschedule) => Some(Self::RescheduleRequest),
            (Self::Pending, A::Confirm) | (Self::RescheduleRequest, A::Accept) => {
                Some(Self::Confirmed)
            }
            (Self::RescheduleRequest, A::Reject)
            | (Self::Pending | Self::RescheduleRequest | Self::Confirmed, A::Cancel) => {
                Some(Self::Cancelled)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operations that move a consultation between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsultationAction {
    /// Manager proposes a different date and time.
    ProposeReschedule,
    /// Manager confirms the requested date and time.
    Confirm,
    /// User accepts the manager's proposal.
    Accept,
    /// User rejects the manager's proposal.
    Reject,
    /// Either party cancels.
    Cancel,
}

impl ConsultationAction {
    /// Every action.
    pub const ALL: [Self; 5] = [
        Self::ProposeReschedule,
        Self::Confirm,
        Self::Accept,
        Self::Reject,
        Self::Cancel,
    ];

    /// Short verb phrase used in error messages.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ProposeReschedule => "propose a reschedule for",
            Self::Confirm => "confirm",
            Self::Accept => "accept a reschedule for",
            Self::Reject => "reject a reschedule for",
            Self::Cancel => "cancel",
        }
    }
}

/// Raised when a persisted status code has no matching status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("status code {code} is not a known consultation status")]
pub struct UnknownStatusCode {
    pub code: i32,
}

/// A `(code, name)` pair listed by the [`StatusCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub code: i32,
    pub name: &'static str,
}

impl From<ConsultationStatus> for StatusEntry {
    fn from(status: ConsultationStatus) -> Self {
        Self {
            code: status.code(),
            name: status.name(),
        }
    }
}

/// Fixed lookup of status codes and names.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusCatalog;

impl StatusCatalog {
    /// Resolve a status code, reporting unknown codes as not found.
    pub fn find_by_code(code: i32) -> Result<ConsultationStatus, Error> {
        ConsultationStatus::from_code(code)
            .map_err(|err| Error::not_found(err.to_string()))
    }

    /// Every catalogued status in code order.
    pub fn entries() -> impl Iterator<Item = StatusEntry> {
        ConsultationStatus::ALL.into_iter().map(StatusEntry::from)
    }
}

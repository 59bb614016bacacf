//! In-app notifications sent to either party of a consultation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ConsultationId, ConsultationStatus, IdValidationError, ManagerId, NotificationId, UserId};

/// Which side of a consultation a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientRole {
    User,
    Manager,
}

impl RecipientRole {
    /// Persisted role name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Manager => "MANAGER",
        }
    }
}

impl fmt::Display for RecipientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a persisted role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("recipient role must be USER or MANAGER, got {0:?}")]
pub struct ParseRecipientRoleError(String);

impl FromStr for RecipientRole {
    type Err = ParseRecipientRoleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "USER" => Ok(Self::User),
            "MANAGER" => Ok(Self::Manager),
            other => Err(ParseRecipientRoleError(other.to_owned())),
        }
    }
}

/// Addressee of a notification: a user or a manager id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recipient {
    id: i64,
    role: RecipientRole,
}

impl Recipient {
    pub fn user(id: UserId) -> Self {
        Self {
            id: id.get(),
            role: RecipientRole::User,
        }
    }

    pub fn manager(id: ManagerId) -> Self {
        Self {
            id: id.get(),
            role: RecipientRole::Manager,
        }
    }

    /// Rebuild a recipient from persisted columns.
    pub fn from_parts(id: i64, role: RecipientRole) -> Result<Self, IdValidationError> {
        match role {
            RecipientRole::User => UserId::new(id).map(Self::user),
            RecipientRole::Manager => ManagerId::new(id).map(Self::manager),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn role(&self) -> RecipientRole {
        self.role
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.id)
    }
}

/// A notification to be stored for a recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient: Recipient,
    pub consultation_id: ConsultationId,
    pub status: ConsultationStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: Recipient,
    pub consultation_id: ConsultationId,
    /// Status the consultation entered when the notification was raised.
    pub status: ConsultationStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl NewNotification {
    /// Materialise the notification once the store has assigned an id.
    pub fn into_notification(self, id: NotificationId) -> Notification {
        Notification {
            id,
            recipient: self.recipient,
            consultation_id: self.consultation_id,
            status: self.status,
            message: self.message,
            created_at: self.created_at,
            is_read: false,
        }
    }
}

//! Numeric identifiers for consultations and the parties they reference.
//!
//! Every identifier is a positive 64-bit integer assigned by the database.
//! Distinct newtypes keep a brand id from being passed where a manager id is
//! expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised when parsing or constructing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// The value is zero or negative.
    #[error("{kind} must be a positive integer, got {value}")]
    NotPositive { kind: &'static str, value: i64 },
    /// The text does not parse as an integer.
    #[error("{kind} must be numeric, got {raw:?}")]
    NotNumeric { kind: &'static str, raw: String },
}

macro_rules! define_numeric_id {
    ($(#[$meta:meta])* $name:ident => $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Validate and wrap a raw identifier.
            pub fn new(value: i64) -> Result<Self, IdValidationError> {
                if value <= 0 {
                    return Err(IdValidationError::NotPositive { kind: $kind, value });
                }
                Ok(Self(value))
            }

            /// The raw identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = IdValidationError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = IdValidationError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let value = raw.trim().parse::<i64>().map_err(|_| {
                    IdValidationError::NotNumeric {
                        kind: $kind,
                        raw: raw.to_owned(),
                    }
                })?;
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_numeric_id! {
    /// Identifier of an end user requesting consultations.
    UserId => "user id"
}

define_numeric_id! {
    /// Identifier of a franchise brand.
    BrandId => "brand id"
}

define_numeric_id! {
    /// Identifier of a brand manager.
    ManagerId => "manager id"
}

define_numeric_id! {
    /// Identifier of a consultation.
    ConsultationId => "consultation id"
}

define_numeric_id! {
    /// Identifier of a stored notification.
    NotificationId => "notification id"
}

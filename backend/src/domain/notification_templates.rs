//! Status-change message templates.
//!
//! One row per status name: the user-facing text names the brand, the
//! manager-facing text names the user. Statuses without a row fall back to a
//! generic "status changed" message.

use super::ConsultationStatus;

struct Template {
    status: &'static str,
    user: &'static str,
    manager: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        status: "PENDING",
        user: "Your consultation request was received and is awaiting confirmation by the brand.",
        manager: "A new consultation request is waiting for your confirmation.",
    },
    Template {
        status: "RESCHEDULE_REQUEST",
        user: "The brand proposed a new consultation schedule.",
        manager: "A schedule change was proposed.",
    },
    Template {
        status: "CONFIRMED",
        user: "Your consultation has been confirmed.",
        manager: "The consultation has been confirmed.",
    },
    Template {
        status: "CANCELLED",
        user: "Your consultation request was cancelled.",
        manager: "The consultation request was cancelled.",
    },
];

const FALLBACK_USER: &str = "Your consultation status has changed.";
const FALLBACK_MANAGER: &str = "The consultation status has changed.";

fn lookup(status_name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.status == status_name)
}

/// Message for the user, prefixed with the brand name.
///
/// # Examples
/// ```
/// use consult_backend::domain::{ConsultationStatus, notification_templates::user_message};
///
/// assert_eq!(
///     user_message(ConsultationStatus::Confirmed, "Blue Bottle"),
///     "[Blue Bottle] Your consultation has been confirmed."
/// );
/// ```
pub fn user_message(status: ConsultationStatus, brand_name: &str) -> String {
    let body = lookup(status.name()).map_or(FALLBACK_USER, |template| template.user);
    format!("[{brand_name}] {body}")
}

/// Message for the brand manager, prefixed with the user's name.
pub fn manager_message(status: ConsultationStatus, user_name: &str) -> String {
    let body = lookup(status.name()).map_or(FALLBACK_MANAGER, |template| template.manager);
    format!("[{user_name}] {body}")
}

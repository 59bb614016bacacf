//! Domain primitives, aggregates and services.
//!
//! Purpose: model the consultation lifecycle (request, reschedule
//! negotiation, confirmation, cancellation) and the notifications it raises,
//! independent of HTTP and SQL. Adapters reach the domain only through the
//! traits in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Consultation and ConsultationStatus: the aggregate and its state
//!   machine.
//! - ConsultationLifecycleService: implements the consultation driving
//!   ports.
//! - NotificationDispatcher / SpawningNotifier: post-commit status-change
//!   notifications.
//! - NotificationService: recipient inbox queries and read markers.

pub mod consultation;
mod consultation_service;
pub mod directory;
pub mod error;
pub mod ids;
pub mod notification;
mod notification_dispatcher;
mod notification_service;
pub mod notification_templates;
pub mod ports;

pub use self::consultation::{
    Actor, Consultation, ConsultationAction, ConsultationDetails, ConsultationDraft,
    ConsultationStatus, ConsultationValidationError, NewConsultation, ParseUserResponseError,
    RescheduleProposal, StatusCatalog, StatusEntry, TransitionError, UnknownStatusCode,
    UserResponse,
};
pub use self::consultation_service::ConsultationLifecycleService;
pub use self::directory::{BrandSummary, UserSummary};
pub use self::error::{Error, ErrorCode};
pub use self::ids::{BrandId, ConsultationId, IdValidationError, ManagerId, NotificationId, UserId};
pub use self::notification::{
    NewNotification, Notification, ParseRecipientRoleError, Recipient, RecipientRole,
};
pub use self::notification_dispatcher::{NotificationDispatcher, SpawningNotifier};
pub use self::notification_service::NotificationService;

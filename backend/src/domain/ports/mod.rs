//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, directories, the status change notifier)
//! describe what the domain needs from adapters. Driving ports (commands and
//! queries) describe what inbound adapters may ask of the domain.

mod macros;
pub(crate) use macros::define_port_error;

mod brand_directory;
mod consultation_command;
mod consultation_query;
mod consultation_repository;
mod notification_inbox;
mod notification_repository;
mod status_change_notifier;
mod user_directory;

#[cfg(test)]
pub use brand_directory::MockBrandDirectory;
pub use brand_directory::{BrandDirectory, BrandDirectoryError, FixtureBrandDirectory};
#[cfg(test)]
pub use consultation_command::MockConsultationCommand;
pub use consultation_command::{
    CancelConsultationRequest, ConfirmConsultationRequest, ConsultationCommand,
    CreateConsultationRequest, FixtureConsultationCommand, ProposeRescheduleRequest,
    RespondToRescheduleRequest,
};
#[cfg(test)]
pub use consultation_query::MockConsultationQuery;
pub use consultation_query::{ConsultationQuery, FixtureConsultationQuery};
#[cfg(test)]
pub use consultation_repository::MockConsultationRepository;
pub use consultation_repository::{
    ConsultationRepository, ConsultationRepositoryError, FixtureConsultationRepository,
};
#[cfg(test)]
pub use notification_inbox::{MockNotificationCommand, MockNotificationQuery};
pub use notification_inbox::{FixtureNotificationInbox, NotificationCommand, NotificationQuery};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationRepository, NotificationRepositoryError,
};
#[cfg(test)]
pub use status_change_notifier::MockStatusChangeNotifier;
pub use status_change_notifier::{FixtureStatusChangeNotifier, StatusChangeNotifier};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{FixtureUserDirectory, UserDirectory, UserDirectoryError};

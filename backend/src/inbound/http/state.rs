//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` so they depend only on the
//! driving ports and stay testable without I/O.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    ConsultationCommand, ConsultationQuery, FixtureConsultationCommand, FixtureConsultationQuery,
    FixtureNotificationInbox, NotificationCommand, NotificationQuery,
};

/// Parameter object bundling the driving ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub consultations: Arc<dyn ConsultationCommand>,
    pub consultations_query: Arc<dyn ConsultationQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            consultations: Arc::new(FixtureConsultationCommand),
            consultations_query: Arc::new(FixtureConsultationQuery),
            notifications: Arc::new(FixtureNotificationInbox),
            notifications_query: Arc::new(FixtureNotificationInbox),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub consultations: Arc<dyn ConsultationCommand>,
    pub consultations_query: Arc<dyn ConsultationQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
    /// Source of "today" for date validation.
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from a ports bundle and a clock.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use consult_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use mockable::DefaultClock;
    ///
    /// let state = HttpState::new(HttpStatePorts::default(), Arc::new(DefaultClock));
    /// let _query = state.consultations_query.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, clock: Arc<dyn Clock>) -> Self {
        let HttpStatePorts {
            consultations,
            consultations_query,
            notifications,
            notifications_query,
        } = ports;
        Self {
            consultations,
            consultations_query,
            notifications,
            notifications_query,
            clock,
        }
    }

    /// Current UTC calendar date.
    pub fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, Arc::new(DefaultClock))
    }
}

//! Wiring of domain services onto persistence adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use consult_backend::domain::{
    ConsultationLifecycleService, NotificationDispatcher, NotificationService, SpawningNotifier,
};
use consult_backend::inbound::http::state::{HttpState, HttpStatePorts};
use consult_backend::outbound::persistence::{
    DbPool, DieselBrandDirectory, DieselConsultationRepository, DieselNotificationRepository,
    DieselUserDirectory,
};

use super::ServerConfig;

/// Ports backed by PostgreSQL.
///
/// Status change notifications run on their own task after each commit.
fn database_ports(pool: &DbPool, clock: &Arc<dyn Clock>) -> HttpStatePorts {
    let notifications = Arc::new(DieselNotificationRepository::new(pool.clone()));
    let dispatcher = NotificationDispatcher::new(Arc::clone(&notifications), Arc::clone(clock));
    let notifier = Arc::new(SpawningNotifier::new(Arc::new(dispatcher)));

    let lifecycle = Arc::new(ConsultationLifecycleService::new(
        Arc::new(DieselConsultationRepository::new(pool.clone())),
        Arc::new(DieselUserDirectory::new(pool.clone())),
        Arc::new(DieselBrandDirectory::new(pool.clone())),
        notifier,
        Arc::clone(clock),
    ));
    let inbox = Arc::new(NotificationService::new(notifications));

    HttpStatePorts {
        consultations: lifecycle.clone(),
        consultations_query: lifecycle,
        notifications: inbox.clone(),
        notifications_query: inbox,
    }
}

/// Build handler state, falling back to fixtures when no pool is configured.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = match &config.db_pool {
        Some(pool) => database_ports(pool, &clock),
        None => HttpStatePorts::default(),
    };
    web::Data::new(HttpState::new(ports, clock))
}

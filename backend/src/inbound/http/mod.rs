//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub mod actor;
pub mod consultations;
pub mod error;
pub mod health;
pub mod notifications;
pub mod paging;
pub mod state;
pub mod statuses;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Mount it inside the versioned scope:
///
/// ```
/// use actix_web::{App, web};
/// use consult_backend::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(statuses::list_statuses)
        .configure(consultations::configure)
        .configure(notifications::configure);
}

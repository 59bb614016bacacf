//! Consultation status catalog endpoint.
//!
//! ```text
//! GET /api/v1/consultation-statuses
//! ```

use actix_web::{get, web};
use serde::Serialize;

use crate::domain::StatusCatalog;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub code: i32,
    pub name: &'static str,
}

/// Every status code with its name, in code order.
#[get("/consultation-statuses")]
pub async fn list_statuses() -> web::Json<Vec<StatusResponse>> {
    web::Json(
        StatusCatalog::entries()
            .map(|entry| StatusResponse {
                code: entry.code,
                name: entry.name,
            })
            .collect(),
    )
}

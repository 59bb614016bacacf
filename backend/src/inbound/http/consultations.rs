//! Consultation lifecycle HTTP handlers.
//!
//! ```text
//! POST   /api/v1/user/consultations
//! GET    /api/v1/user/consultations
//! GET    /api/v1/user/consultations/reschedule-requests
//! PUT    /api/v1/user/consultations/{id}/respond
//! DELETE /api/v1/user/consultations/{id}
//! GET    /api/v1/manager/consultations
//! PUT    /api/v1/manager/consultations/{id}/reschedule
//! PUT    /api/v1/manager/consultations/{id}/confirm
//! DELETE /api/v1/manager/consultations/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{
    CancelConsultationRequest, ConfirmConsultationRequest, CreateConsultationRequest,
    ProposeRescheduleRequest, RespondToRescheduleRequest,
};
use crate::domain::{
    Actor, BrandId, ConsultationDetails, ConsultationId, Error, RescheduleProposal, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::{CallingManager, CallingUser};
use crate::inbound::http::paging::{PageQuery, PageResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, MAX_MANAGER_NOTE_CHARS, MAX_REASON_CHARS, check_max_chars, parse_future_date,
    parse_time, parse_user_response, require,
};

/// Body of `POST /user/consultations`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsultationBody {
    pub brand_id: Option<i64>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
}

/// Body of `PUT /manager/consultations/{id}/reschedule`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    pub adjusted_date: Option<String>,
    pub adjusted_time: Option<String>,
    /// Also accepted as `reason`.
    #[serde(alias = "reason")]
    pub adjustment_reason: Option<String>,
    pub manager_note: Option<String>,
}

/// Body of `PUT /user/consultations/{id}/respond`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
    pub user_response: Option<String>,
}

/// A consultation with the names a client needs to render it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationResponse {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub brand_id: i64,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub status_code: i32,
    pub status: &'static str,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub manager_note: Option<String>,
    pub adjusted_date: Option<NaiveDate>,
    pub adjusted_time: Option<NaiveTime>,
    pub adjustment_reason: Option<String>,
    pub adjustment_requested_at: Option<DateTime<Utc>>,
    pub user_response: Option<&'static str>,
    pub user_response_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub revision: u32,
}

impl From<ConsultationDetails> for ConsultationResponse {
    fn from(value: ConsultationDetails) -> Self {
        let ConsultationDetails {
            consultation: c,
            user,
            brand,
        } = value;
        let (user_name, user_email, user_phone) = match user {
            Some(user) => (Some(user.name), user.email, user.phone),
            None => (None, None, None),
        };
        let (brand_name, category_name) = match brand {
            Some(brand) => (Some(brand.name), brand.category_name),
            None => (None, None),
        };
        Self {
            id: c.id().get(),
            user_id: c.user_id().get(),
            user_name,
            user_email,
            user_phone,
            brand_id: c.brand_id().get(),
            brand_name,
            category_name,
            status_code: c.status().code(),
            status: c.status().name(),
            preferred_date: c.preferred_date(),
            preferred_time: c.preferred_time(),
            manager_note: c.manager_note().map(str::to_owned),
            adjusted_date: c.adjusted_date(),
            adjusted_time: c.adjusted_time(),
            adjustment_reason: c.adjustment_reason().map(str::to_owned),
            adjustment_requested_at: c.adjustment_requested_at(),
            user_response: c.user_response().map(|response| response.as_str()),
            user_response_at: c.user_response_at(),
            created_at: c.created_at(),
            confirmed_at: c.confirmed_at(),
            is_active: c.is_active(),
            revision: c.revision(),
        }
    }
}

fn parse_consultation_id(raw: &str) -> Result<ConsultationId, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request("consultation id must be a positive integer").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_id",
        }))
    })
}

fn parse_create_body(
    user_id: UserId,
    body: CreateConsultationBody,
    today: NaiveDate,
) -> Result<CreateConsultationRequest, Error> {
    let brand_field = FieldName::new("brandId");
    let date_field = FieldName::new("preferredDate");
    let time_field = FieldName::new("preferredTime");

    let raw_brand = require(body.brand_id, brand_field)?;
    let brand_id = BrandId::new(raw_brand).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": "brandId",
            "code": "invalid_id",
        }))
    })?;
    let preferred_date = parse_future_date(
        &require(body.preferred_date, date_field)?,
        date_field,
        today,
    )?;
    let preferred_time = parse_time(&require(body.preferred_time, time_field)?, time_field)?;

    Ok(CreateConsultationRequest {
        user_id,
        brand_id,
        preferred_date,
        preferred_time,
    })
}

fn parse_reschedule_body(body: RescheduleBody, today: NaiveDate) -> Result<RescheduleProposal, Error> {
    let date_field = FieldName::new("adjustedDate");
    let time_field = FieldName::new("adjustedTime");

    let date = parse_future_date(&require(body.adjusted_date, date_field)?, date_field, today)?;
    let time = parse_time(&require(body.adjusted_time, time_field)?, time_field)?;
    if let Some(reason) = body.adjustment_reason.as_deref() {
        check_max_chars(reason, FieldName::new("adjustmentReason"), MAX_REASON_CHARS)?;
    }
    if let Some(note) = body.manager_note.as_deref() {
        check_max_chars(note, FieldName::new("managerNote"), MAX_MANAGER_NOTE_CHARS)?;
    }

    Ok(RescheduleProposal {
        date,
        time,
        reason: body.adjustment_reason,
        manager_note: body.manager_note,
    })
}

/// Request a consultation with a brand.
#[post("/user/consultations")]
pub async fn create_consultation(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
    payload: web::Json<CreateConsultationBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_body(user_id, payload.into_inner(), state.today())?;
    let created = state.consultations.create(request).await?;
    Ok(HttpResponse::Created().json(ConsultationResponse::from(created)))
}

/// The caller's consultations, newest first, cancelled ones included.
#[get("/user/consultations")]
pub async fn list_user_consultations(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<ConsultationResponse>>> {
    let page = state
        .consultations_query
        .list_for_user(user_id, query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(PageResponse::from_page(page, ConsultationResponse::from)))
}

/// Proposals awaiting the caller's answer.
#[get("/user/consultations/reschedule-requests")]
pub async fn list_reschedule_requests(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
) -> ApiResult<web::Json<Vec<ConsultationResponse>>> {
    let pending = state
        .consultations_query
        .list_reschedule_requests(user_id)
        .await?;
    Ok(web::Json(
        pending.into_iter().map(ConsultationResponse::from).collect(),
    ))
}

/// Accept or reject a reschedule proposal.
#[put("/user/consultations/{id}/respond")]
pub async fn respond_to_reschedule(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
    path: web::Path<String>,
    payload: web::Json<RespondBody>,
) -> ApiResult<web::Json<ConsultationResponse>> {
    let consultation_id = parse_consultation_id(&path)?;
    let field = FieldName::new("userResponse");
    let response = parse_user_response(&require(payload.into_inner().user_response, field)?, field)?;

    let updated = state
        .consultations
        .respond(RespondToRescheduleRequest {
            consultation_id,
            user_id,
            response,
        })
        .await?;
    Ok(web::Json(ConsultationResponse::from(updated)))
}

/// Cancel one of the caller's consultations.
#[delete("/user/consultations/{id}")]
pub async fn cancel_as_user(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let consultation_id = parse_consultation_id(&path)?;
    state
        .consultations
        .cancel(CancelConsultationRequest {
            consultation_id,
            actor: Actor::User(user_id),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Consultations for every brand the caller manages.
#[get("/manager/consultations")]
pub async fn list_manager_consultations(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<ConsultationResponse>>> {
    let page = state
        .consultations_query
        .list_for_manager(manager_id, query.into_inner().to_request()?)
        .await?;
    Ok(web::Json(PageResponse::from_page(page, ConsultationResponse::from)))
}

/// Propose a new date and time for a pending consultation.
#[put("/manager/consultations/{id}/reschedule")]
pub async fn propose_reschedule(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
    path: web::Path<String>,
    payload: web::Json<RescheduleBody>,
) -> ApiResult<web::Json<ConsultationResponse>> {
    let consultation_id = parse_consultation_id(&path)?;
    let proposal = parse_reschedule_body(payload.into_inner(), state.today())?;

    let updated = state
        .consultations
        .propose_reschedule(ProposeRescheduleRequest {
            consultation_id,
            manager_id,
            proposal,
        })
        .await?;
    Ok(web::Json(ConsultationResponse::from(updated)))
}

/// Confirm a pending consultation at its requested date and time.
#[put("/manager/consultations/{id}/confirm")]
pub async fn confirm_consultation(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
    path: web::Path<String>,
) -> ApiResult<web::Json<ConsultationResponse>> {
    let consultation_id = parse_consultation_id(&path)?;
    let updated = state
        .consultations
        .confirm(ConfirmConsultationRequest {
            consultation_id,
            manager_id,
        })
        .await?;
    Ok(web::Json(ConsultationResponse::from(updated)))
}

/// Cancel a consultation for one of the caller's brands.
#[delete("/manager/consultations/{id}")]
pub async fn cancel_as_manager(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let consultation_id = parse_consultation_id(&path)?;
    state
        .consultations
        .cancel(CancelConsultationRequest {
            consultation_id,
            actor: Actor::Manager(manager_id),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register every consultation handler on `cfg`.
///
/// The reschedule-request listing is registered before the `{id}` routes
/// so the literal segment wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_reschedule_requests)
        .service(create_consultation)
        .service(list_user_consultations)
        .service(respond_to_reschedule)
        .service(cancel_as_user)
        .service(list_manager_consultations)
        .service(propose_reschedule)
        .service(confirm_consultation)
        .service(cancel_as_manager);
}

#[cfg(test)]
#[path = "consultations_tests.rs"]
mod tests;

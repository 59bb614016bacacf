//! Notification inbox HTTP handlers.
//!
//! Users and managers each get the same four endpoints under their own
//! prefix; the caller header decides whose inbox is read.
//!
//! ```text
//! GET /api/v1/{user,manager}/notifications
//! GET /api/v1/{user,manager}/notifications/unread-count
//! PUT /api/v1/{user,manager}/notifications/{id}/read
//! PUT /api/v1/{user,manager}/notifications/read-all
//! ```

use actix_web::{HttpResponse, get, put, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::{Error, Notification, NotificationId, Recipient};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::{CallingManager, CallingUser};
use crate::inbound::http::paging::{PageQuery, PageResponse};
use crate::inbound::http::state::HttpState;

/// A stored notification as rendered to its recipient.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: i64,
    pub recipient_id: i64,
    pub recipient_role: &'static str,
    pub consultation_id: i64,
    pub status: &'static str,
    pub status_code: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        Self {
            id: value.id.get(),
            recipient_id: value.recipient.id(),
            recipient_role: value.recipient.role().as_str(),
            consultation_id: value.consultation_id.get(),
            status: value.status.name(),
            status_code: value.status.code(),
            message: value.message,
            created_at: value.created_at,
            is_read: value.is_read,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

fn parse_notification_id(raw: &str) -> Result<NotificationId, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request("notification id must be a positive integer").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_id",
        }))
    })
}

async fn inbox(
    state: &HttpState,
    recipient: Recipient,
    query: PageQuery,
) -> ApiResult<web::Json<PageResponse<NotificationResponse>>> {
    let page = state
        .notifications_query
        .list_for_recipient(recipient, query.to_request()?)
        .await?;
    Ok(web::Json(PageResponse::from_page(page, NotificationResponse::from)))
}

async fn unread(state: &HttpState, recipient: Recipient) -> ApiResult<web::Json<UnreadCountResponse>> {
    let unread_count = state.notifications_query.unread_count(recipient).await?;
    Ok(web::Json(UnreadCountResponse { unread_count }))
}

async fn read_one(state: &HttpState, recipient: Recipient, raw_id: &str) -> ApiResult<HttpResponse> {
    let notification_id = parse_notification_id(raw_id)?;
    state
        .notifications
        .mark_read(notification_id, recipient)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn read_all(state: &HttpState, recipient: Recipient) -> ApiResult<web::Json<MarkAllReadResponse>> {
    let updated = state.notifications.mark_all_read(recipient).await?;
    Ok(web::Json(MarkAllReadResponse { updated }))
}

#[get("/user/notifications")]
pub async fn user_inbox(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<NotificationResponse>>> {
    inbox(&state, Recipient::user(user_id), query.into_inner()).await
}

#[get("/user/notifications/unread-count")]
pub async fn user_unread_count(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
) -> ApiResult<web::Json<UnreadCountResponse>> {
    unread(&state, Recipient::user(user_id)).await
}

#[put("/user/notifications/{id}/read")]
pub async fn user_mark_read(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    read_one(&state, Recipient::user(user_id), &path).await
}

#[put("/user/notifications/read-all")]
pub async fn user_mark_all_read(
    state: web::Data<HttpState>,
    CallingUser(user_id): CallingUser,
) -> ApiResult<web::Json<MarkAllReadResponse>> {
    read_all(&state, Recipient::user(user_id)).await
}

#[get("/manager/notifications")]
pub async fn manager_inbox(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<NotificationResponse>>> {
    inbox(&state, Recipient::manager(manager_id), query.into_inner()).await
}

#[get("/manager/notifications/unread-count")]
pub async fn manager_unread_count(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
) -> ApiResult<web::Json<UnreadCountResponse>> {
    unread(&state, Recipient::manager(manager_id)).await
}

#[put("/manager/notifications/{id}/read")]
pub async fn manager_mark_read(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    read_one(&state, Recipient::manager(manager_id), &path).await
}

#[put("/manager/notifications/read-all")]
pub async fn manager_mark_all_read(
    state: web::Data<HttpState>,
    CallingManager(manager_id): CallingManager,
) -> ApiResult<web::Json<MarkAllReadResponse>> {
    read_all(&state, Recipient::manager(manager_id)).await
}

/// Register the inbox handlers for both roles on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(user_unread_count)
        .service(user_mark_all_read)
        .service(user_inbox)
        .service(user_mark_read)
        .service(manager_unread_count)
        .service(manager_mark_all_read)
        .service(manager_inbox)
        .service(manager_mark_read);
}

//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;

use super::schema::{consultations, notifications, users};

/// Row struct for reading from the consultations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = consultations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConsultationRow {
    pub id: i64,
    pub user_id: i64,
    pub brand_id: i64,
    pub status_code: i32,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub manager_note: Option<String>,
    pub adjusted_date: Option<NaiveDate>,
    pub adjusted_time: Option<NaiveTime>,
    pub adjustment_reason: Option<String>,
    pub adjustment_requested_at: Option<DateTime<Utc>>,
    pub user_response: Option<String>,
    pub user_response_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub revision: i32,
}

/// Insertable struct for a freshly requested consultation.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = consultations)]
pub(crate) struct NewConsultationRow {
    pub user_id: i64,
    pub brand_id: i64,
    pub status_code: i32,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub revision: i32,
}

/// Changeset written by every lifecycle transition.
///
/// `None` clears the column rather than leaving it untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = consultations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ConsultationUpdate<'a> {
    pub status_code: i32,
    pub preferred_date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub manager_note: Option<&'a str>,
    pub adjusted_date: Option<NaiveDate>,
    pub adjusted_time: Option<NaiveTime>,
    pub adjustment_reason: Option<&'a str>,
    pub adjustment_requested_at: Option<DateTime<Utc>>,
    pub user_response: Option<&'a str>,
    pub user_response_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub revision: i32,
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Brand joined with its category name.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct BrandRow {
    pub id: i64,
    pub name: String,
    pub category_name: Option<String>,
    pub manager_id: Option<i64>,
}

/// Row struct for reading from the notifications table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: i64,
    pub recipient_id: i64,
    pub recipient_role: String,
    pub consultation_id: i64,
    pub status_code: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Insertable struct for storing a new notification.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub recipient_id: i64,
    pub recipient_role: &'a str,
    pub consultation_id: i64,
    pub status_code: i32,
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

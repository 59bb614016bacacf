//! PostgreSQL-backed `ConsultationRepository` implementation using Diesel ORM.
//!
//! The one-active-consultation rule is enforced by the partial unique index
//! `consultations_one_active_per_user_brand`; a violation on insert surfaces
//! as `DuplicateActive`. Updates filter on `(id, revision)` so a concurrent
//! transition leaves zero rows affected and is reported as a revision
//! mismatch.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use tracing::warn;

use crate::domain::ports::{ConsultationRepository, ConsultationRepositoryError};
use crate::domain::{
    BrandId, Consultation, ConsultationDraft, ConsultationId, ConsultationStatus,
    NewConsultation, UserId, UserResponse,
};

use super::diesel_error_mapping::{
    count_to_u64, is_unique_violation, map_diesel_error, map_pool_error, to_sql_bigint,
};
use super::models::{ConsultationRow, ConsultationUpdate, NewConsultationRow};
use super::pool::{DbPool, PoolError};
use super::schema::consultations;

/// Name of the partial unique index guarding the active slot.
const ACTIVE_SLOT_INDEX: &str = "consultations_one_active_per_user_brand";

/// Status codes that occupy the (user, brand) slot.
const OCCUPYING_CODES: [i32; 3] = [
    ConsultationStatus::Pending.code(),
    ConsultationStatus::RescheduleRequest.code(),
    ConsultationStatus::Confirmed.code(),
];

/// Diesel-backed implementation of the `ConsultationRepository` port.
#[derive(Clone)]
pub struct DieselConsultationRepository {
    pool: DbPool,
}

impl DieselConsultationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ConsultationRepositoryError {
    map_pool_error(error, ConsultationRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ConsultationRepositoryError {
    map_diesel_error(
        error,
        ConsultationRepositoryError::query,
        ConsultationRepositoryError::connection,
    )
}

fn revision_from_db(revision: i32) -> Result<u32, ConsultationRepositoryError> {
    u32::try_from(revision).map_err(|_| {
        ConsultationRepositoryError::query(format!("negative revision {revision} in database"))
    })
}

fn revision_for_db(revision: u32) -> Result<i32, ConsultationRepositoryError> {
    i32::try_from(revision).map_err(|_| {
        ConsultationRepositoryError::query(format!("revision {revision} exceeds INTEGER"))
    })
}

/// Convert a database row into a validated domain consultation.
fn row_to_consultation(row: ConsultationRow) -> Result<Consultation, ConsultationRepositoryError> {
    let invalid = |message: String| ConsultationRepositoryError::query(message);

    let user_response = row
        .user_response
        .as_deref()
        .map(str::parse::<UserResponse>)
        .transpose()
        .map_err(|err| invalid(err.to_string()))?;

    let draft = ConsultationDraft {
        id: ConsultationId::new(row.id).map_err(|err| invalid(err.to_string()))?,
        user_id: UserId::new(row.user_id).map_err(|err| invalid(err.to_string()))?,
        brand_id: BrandId::new(row.brand_id).map_err(|err| invalid(err.to_string()))?,
        status: ConsultationStatus::from_code(row.status_code)
            .map_err(|err| invalid(err.to_string()))?,
        preferred_date: row.preferred_date,
        preferred_time: row.preferred_time,
        manager_note: row.manager_note,
        adjusted_date: row.adjusted_date,
        adjusted_time: row.adjusted_time,
        adjustment_reason: row.adjustment_reason,
        adjustment_requested_at: row.adjustment_requested_at,
        user_response,
        user_response_at: row.user_response_at,
        created_at: row.created_at,
        confirmed_at: row.confirmed_at,
        is_active: row.is_active,
        revision: revision_from_db(row.revision)?,
    };

    Consultation::restore(draft).map_err(|err| {
        warn!(consultation_id = row.id, error = %err, "inconsistent consultation row");
        invalid(err.to_string())
    })
}

fn rows_to_consultations(
    rows: Vec<ConsultationRow>,
) -> Result<Vec<Consultation>, ConsultationRepositoryError> {
    rows.into_iter().map(row_to_consultation).collect()
}

/// Work out why an optimistic update touched no rows.
async fn handle_update_failure<C>(
    conn: &mut C,
    consultation_id: i64,
    expected_revision: u32,
) -> ConsultationRepositoryError
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    let current = consultations::table
        .filter(consultations::id.eq(consultation_id))
        .select(consultations::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel);

    match current {
        Ok(Some(actual)) => match revision_from_db(actual) {
            Ok(actual) => ConsultationRepositoryError::revision_mismatch(expected_revision, actual),
            Err(err) => err,
        },
        Ok(None) => ConsultationRepositoryError::query(format!(
            "consultation {consultation_id} not found for update"
        )),
        Err(err) => err,
    }
}

#[async_trait]
impl ConsultationRepository for DieselConsultationRepository {
    async fn find_by_id(
        &self,
        consultation_id: &ConsultationId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<ConsultationRow> = consultations::table
            .filter(consultations::id.eq(consultation_id.get()))
            .select(ConsultationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_consultation).transpose()
    }

    async fn find_active_by_user_and_brand(
        &self,
        user_id: &UserId,
        brand_id: &BrandId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<ConsultationRow> = consultations::table
            .filter(consultations::user_id.eq(user_id.get()))
            .filter(consultations::brand_id.eq(brand_id.get()))
            .filter(consultations::is_active.eq(true))
            .filter(consultations::status_code.eq_any(OCCUPYING_CODES))
            .select(ConsultationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_consultation).transpose()
    }

    async fn insert(
        &self,
        consultation: &NewConsultation,
    ) -> Result<Consultation, ConsultationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewConsultationRow {
            user_id: consultation.user_id.get(),
            brand_id: consultation.brand_id.get(),
            status_code: ConsultationStatus::Pending.code(),
            preferred_date: consultation.preferred_date,
            preferred_time: consultation.preferred_time,
            created_at: consultation.created_at,
            is_active: true,
            revision: 1,
        };

        let row = diesel::insert_into(consultations::table)
            .values(&new_row)
            .returning(ConsultationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, ACTIVE_SLOT_INDEX) {
                    ConsultationRepositoryError::duplicate_active(
                        consultation.user_id,
                        consultation.brand_id,
                    )
                } else {
                    map_diesel(err)
                }
            })?;

        row_to_consultation(row)
    }

    async fn update(
        &self,
        consultation: &Consultation,
        expected_revision: u32,
    ) -> Result<(), ConsultationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let changes = ConsultationUpdate {
            status_code: consultation.status().code(),
            preferred_date: consultation.preferred_date(),
            preferred_time: consultation.preferred_time(),
            manager_note: consultation.manager_note(),
            adjusted_date: consultation.adjusted_date(),
            adjusted_time: consultation.adjusted_time(),
            adjustment_reason: consultation.adjustment_reason(),
            adjustment_requested_at: consultation.adjustment_requested_at(),
            user_response: consultation.user_response().map(UserResponse::as_str),
            user_response_at: consultation.user_response_at(),
            confirmed_at: consultation.confirmed_at(),
            is_active: consultation.is_active(),
            revision: revision_for_db(consultation.revision())?,
        };

        let id = consultation.id().get();
        let updated = diesel::update(consultations::table)
            .filter(consultations::id.eq(id))
            .filter(consultations::revision.eq(revision_for_db(expected_revision)?))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if updated == 0 {
            return Err(handle_update_failure(&mut conn, id, expected_revision).await);
        }
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let total: i64 = consultations::table
            .filter(consultations::user_id.eq(user_id.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<ConsultationRow> = consultations::table
            .filter(consultations::user_id.eq(user_id.get()))
            .order((consultations::created_at.desc(), consultations::id.desc()))
            .limit(to_sql_bigint(page.limit(), ConsultationRepositoryError::query)?)
            .offset(to_sql_bigint(page.offset(), ConsultationRepositoryError::query)?)
            .select(ConsultationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(Page::new(rows_to_consultations(rows)?, page, count_to_u64(total)))
    }

    async fn list_for_brands(
        &self,
        brand_ids: &[BrandId],
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError> {
        if brand_ids.is_empty() {
            return Ok(Page::empty(page));
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let raw_ids: Vec<i64> = brand_ids.iter().map(|id| id.get()).collect();

        let total: i64 = consultations::table
            .filter(consultations::brand_id.eq_any(&raw_ids))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<ConsultationRow> = consultations::table
            .filter(consultations::brand_id.eq_any(&raw_ids))
            .order((consultations::created_at.desc(), consultations::id.desc()))
            .limit(to_sql_bigint(page.limit(), ConsultationRepositoryError::query)?)
            .offset(to_sql_bigint(page.offset(), ConsultationRepositoryError::query)?)
            .select(ConsultationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(Page::new(rows_to_consultations(rows)?, page, count_to_u64(total)))
    }

    async fn list_reschedule_requests(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Consultation>, ConsultationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<ConsultationRow> = consultations::table
            .filter(consultations::user_id.eq(user_id.get()))
            .filter(consultations::is_active.eq(true))
            .filter(consultations::status_code.eq(ConsultationStatus::RescheduleRequest.code()))
            .order((consultations::created_at.desc(), consultations::id.desc()))
            .select(ConsultationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows_to_consultations(rows)
    }
}

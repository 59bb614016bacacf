//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{
    ConsultationId, ConsultationStatus, NewNotification, Notification, NotificationId, Recipient,
    RecipientRole,
};

use super::diesel_error_mapping::{
    count_to_u64, map_diesel_error, map_pool_error, to_sql_bigint,
};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> NotificationRepositoryError {
    map_pool_error(error, NotificationRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> NotificationRepositoryError {
    map_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    let invalid = |message: String| NotificationRepositoryError::query(message);
    let role = row
        .recipient_role
        .parse::<RecipientRole>()
        .map_err(|err| invalid(err.to_string()))?;

    Ok(Notification {
        id: NotificationId::new(row.id).map_err(|err| invalid(err.to_string()))?,
        recipient: Recipient::from_parts(row.recipient_id, role)
            .map_err(|err| invalid(err.to_string()))?,
        consultation_id: ConsultationId::new(row.consultation_id)
            .map_err(|err| invalid(err.to_string()))?,
        status: ConsultationStatus::from_code(row.status_code)
            .map_err(|err| invalid(err.to_string()))?,
        message: row.message,
        created_at: row.created_at,
        is_read: row.is_read,
    })
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewNotificationRow {
            recipient_id: notification.recipient.id(),
            recipient_role: notification.recipient.role().as_str(),
            consultation_id: notification.consultation_id.get(),
            status_code: notification.status.code(),
            message: &notification.message,
            created_at: notification.created_at,
            is_read: false,
        };

        let row = diesel::insert_into(notifications::table)
            .values(&new_row)
            .returning(NotificationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        row_to_notification(row)
    }

    async fn find_by_id(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<NotificationRow> = notifications::table
            .filter(notifications::id.eq(notification_id.get()))
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_notification).transpose()
    }

    async fn list_for_recipient(
        &self,
        recipient: &Recipient,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let role = recipient.role().as_str();

        let total: i64 = notifications::table
            .filter(notifications::recipient_id.eq(recipient.id()))
            .filter(notifications::recipient_role.eq(role))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::recipient_id.eq(recipient.id()))
            .filter(notifications::recipient_role.eq(role))
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(to_sql_bigint(page.limit(), NotificationRepositoryError::query)?)
            .offset(to_sql_bigint(page.offset(), NotificationRepositoryError::query)?)
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let items = rows
            .into_iter()
            .map(row_to_notification)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, page, count_to_u64(total)))
    }

    async fn count_unread(&self, recipient: &Recipient) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let unread: i64 = notifications::table
            .filter(notifications::recipient_id.eq(recipient.id()))
            .filter(notifications::recipient_role.eq(recipient.role().as_str()))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(count_to_u64(unread))
    }

    async fn mark_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(notifications::table)
            .filter(notifications::id.eq(notification_id.get()))
            .set(notifications::is_read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(updated > 0)
    }

    async fn mark_all_read(
        &self,
        recipient: &Recipient,
    ) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(notifications::table)
            .filter(notifications::recipient_id.eq(recipient.id()))
            .filter(notifications::recipient_role.eq(recipient.role().as_str()))
            .filter(notifications::is_read.eq(false))
            .set(notifications::is_read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(u64::try_from(updated).unwrap_or(u64::MAX))
    }
}

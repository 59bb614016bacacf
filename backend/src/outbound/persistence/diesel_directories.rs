//! PostgreSQL-backed user and brand directories.
//!
//! Both adapters are read-only views over tables owned by other parts of the
//! platform.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{BrandDirectory, BrandDirectoryError, UserDirectory, UserDirectoryError};
use crate::domain::{BrandId, BrandSummary, ManagerId, UserId, UserSummary};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BrandRow, UserRow};
use super::pool::DbPool;
use super::schema::{brand_categories, brands, users};

/// Diesel-backed implementation of the `UserDirectory` port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: UserRow) -> Result<UserSummary, UserDirectoryError> {
    Ok(UserSummary {
        id: UserId::new(row.id).map_err(|err| UserDirectoryError::query(err.to_string()))?,
        name: row.name,
        email: row.email,
        phone: row.phone,
    })
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserSummary>, UserDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserDirectoryError::connection))?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(user_id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| {
                map_diesel_error(err, UserDirectoryError::query, UserDirectoryError::connection)
            })?;

        row.map(row_to_user).transpose()
    }
}

/// Diesel-backed implementation of the `BrandDirectory` port.
#[derive(Clone)]
pub struct DieselBrandDirectory {
    pool: DbPool,
}

impl DieselBrandDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_brand_diesel(error: diesel::result::Error) -> BrandDirectoryError {
    map_diesel_error(error, BrandDirectoryError::query, BrandDirectoryError::connection)
}

fn row_to_brand(row: BrandRow) -> Result<BrandSummary, BrandDirectoryError> {
    let invalid = |message: String| BrandDirectoryError::query(message);
    Ok(BrandSummary {
        id: BrandId::new(row.id).map_err(|err| invalid(err.to_string()))?,
        name: row.name,
        category_name: row.category_name,
        manager_id: row
            .manager_id
            .map(ManagerId::new)
            .transpose()
            .map_err(|err| invalid(err.to_string()))?,
    })
}

#[async_trait]
impl BrandDirectory for DieselBrandDirectory {
    async fn find_brand(
        &self,
        brand_id: &BrandId,
    ) -> Result<Option<BrandSummary>, BrandDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BrandDirectoryError::connection))?;

        let row: Option<BrandRow> = brands::table
            .left_join(brand_categories::table)
            .filter(brands::id.eq(brand_id.get()))
            .select((
                brands::id,
                brands::name,
                brand_categories::name.nullable(),
                brands::manager_id,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_brand_diesel)?;

        row.map(row_to_brand).transpose()
    }

    async fn brands_managed_by(
        &self,
        manager_id: &ManagerId,
    ) -> Result<Vec<BrandId>, BrandDirectoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, BrandDirectoryError::connection))?;

        let ids: Vec<i64> = brands::table
            .filter(brands::manager_id.eq(manager_id.get()))
            .order(brands::id.asc())
            .select(brands::id)
            .load(&mut conn)
            .await
            .map_err(map_brand_diesel)?;

        ids.into_iter()
            .map(|id| BrandId::new(id).map_err(|err| BrandDirectoryError::query(err.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn brand_row_without_manager_converts() {
        let brand = row_to_brand(BrandRow {
            id: 10,
            name: "Blue Bottle".to_owned(),
            category_name: Some("Cafe".to_owned()),
            manager_id: None,
        })
        .expect("valid row");
        assert_eq!(brand.manager_id, None);
        assert_eq!(brand.category_name.as_deref(), Some("Cafe"));
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    fn non_positive_manager_ids_are_rejected(#[case] manager_id: i64) {
        let result = row_to_brand(BrandRow {
            id: 10,
            name: "Blue Bottle".to_owned(),
            category_name: None,
            manager_id: Some(manager_id),
        });
        assert!(matches!(result, Err(BrandDirectoryError::Query { .. })));
    }

    #[rstest]
    fn user_row_converts() {
        let user = row_to_user(UserRow {
            id: 1,
            name: "Dana".to_owned(),
            email: Some("dana@example.com".to_owned()),
            phone: None,
        })
        .expect("valid row");
        assert_eq!(user.id.get(), 1);
        assert_eq!(user.name, "Dana");
    }
}

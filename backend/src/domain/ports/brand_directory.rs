//! Port for resolving brands and the managers who own them.

use async_trait::async_trait;

use crate::domain::{BrandId, BrandSummary, ManagerId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by brand directory adapters.
    pub enum BrandDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "brand directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "brand directory query failed: {message}",
    }
}

/// Read-only lookup of brands and manager ownership.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrandDirectory: Send + Sync {
    /// Find a brand summary, returning `None` for unknown ids.
    async fn find_brand(&self, brand_id: &BrandId)
    -> Result<Option<BrandSummary>, BrandDirectoryError>;

    /// Ids of every brand `manager_id` manages.
    async fn brands_managed_by(
        &self,
        manager_id: &ManagerId,
    ) -> Result<Vec<BrandId>, BrandDirectoryError>;
}

/// Fixture directory that knows no brands.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBrandDirectory;

#[async_trait]
impl BrandDirectory for FixtureBrandDirectory {
    async fn find_brand(
        &self,
        _brand_id: &BrandId,
    ) -> Result<Option<BrandSummary>, BrandDirectoryError> {
        Ok(None)
    }

    async fn brands_managed_by(
        &self,
        _manager_id: &ManagerId,
    ) -> Result<Vec<BrandId>, BrandDirectoryError> {
        Ok(Vec::new())
    }
}

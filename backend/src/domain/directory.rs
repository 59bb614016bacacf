//! Read-only summaries of users and brands referenced by consultations.
//!
//! User and brand lifecycles are owned elsewhere; the consultation service
//! only needs enough identity to validate references, authorise managers and
//! word notifications.

use super::{BrandId, ManagerId, UserId};

/// Identity and contact details of an end user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A franchise brand and the manager responsible for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandSummary {
    pub id: BrandId,
    pub name: String,
    pub category_name: Option<String>,
    /// `None` while no manager has been assigned to the brand.
    pub manager_id: Option<ManagerId>,
}

impl BrandSummary {
    /// Whether `manager_id` manages this brand.
    pub fn is_managed_by(&self, manager_id: ManagerId) -> bool {
        self.manager_id == Some(manager_id)
    }
}

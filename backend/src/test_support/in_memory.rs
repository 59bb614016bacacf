//! In-memory adapters for the driven ports.
//!
//! Each adapter keeps its state behind a single mutex so that check-and-write
//! sequences (the active-slot check in `insert`, the revision check in
//! `update`) are atomic, mirroring the guarantees of the SQL schema.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    BrandDirectory, BrandDirectoryError, ConsultationRepository, ConsultationRepositoryError,
    NotificationRepository, NotificationRepositoryError, UserDirectory, UserDirectoryError,
};
use crate::domain::{
    BrandId, BrandSummary, Consultation, ConsultationId, ConsultationStatus, ManagerId,
    NewConsultation, NewNotification, Notification, NotificationId, Recipient, UserId,
    UserSummary,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |len| len.saturating_add(1))
}

/// Slice `rows` (already in display order) into the requested page.
fn paginate<T>(rows: Vec<T>, request: PageRequest) -> Page<T> {
    let total = rows.len() as u64;
    let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
    let items = rows.into_iter().skip(offset).take(limit).collect();
    Page::new(items, request, total)
}

/// Newest first, ties broken by id so ordering is stable.
fn newest_first(rows: &mut [Consultation]) {
    rows.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().cmp(&a.id()))
    });
}

/// Consultation store keyed by id.
///
/// The active-slot lookup yields to the scheduler after reading, so callers
/// racing on the same slot all observe it empty before any of them inserts.
#[derive(Default)]
pub struct InMemoryConsultationRepository {
    rows: Mutex<BTreeMap<ConsultationId, Consultation>>,
    slot_conflicts: AtomicUsize,
}

impl InMemoryConsultationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored state of a consultation.
    pub fn get(&self, consultation_id: ConsultationId) -> Option<Consultation> {
        lock(&self.rows).get(&consultation_id).cloned()
    }

    /// Every stored consultation, in id order.
    pub fn all(&self) -> Vec<Consultation> {
        lock(&self.rows).values().cloned().collect()
    }

    /// How many consultations occupy the (user, brand) slot.
    pub fn occupying(&self, user_id: UserId, brand_id: BrandId) -> usize {
        lock(&self.rows)
            .values()
            .filter(|row| {
                row.user_id() == user_id && row.brand_id() == brand_id && row.occupies_slot()
            })
            .count()
    }

    /// Inserts refused because the slot was already occupied.
    pub fn slot_conflicts(&self) -> usize {
        self.slot_conflicts.load(Ordering::SeqCst)
    }

    fn select(&self, predicate: impl Fn(&Consultation) -> bool) -> Vec<Consultation> {
        let mut rows: Vec<Consultation> = lock(&self.rows)
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect();
        newest_first(&mut rows);
        rows
    }
}

#[async_trait]
impl ConsultationRepository for InMemoryConsultationRepository {
    async fn find_by_id(
        &self,
        consultation_id: &ConsultationId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError> {
        Ok(self.get(*consultation_id))
    }

    async fn find_active_by_user_and_brand(
        &self,
        user_id: &UserId,
        brand_id: &BrandId,
    ) -> Result<Option<Consultation>, ConsultationRepositoryError> {
        let found = lock(&self.rows)
            .values()
            .find(|row| {
                row.user_id() == *user_id && row.brand_id() == *brand_id && row.occupies_slot()
            })
            .cloned();
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn insert(
        &self,
        consultation: &NewConsultation,
    ) -> Result<Consultation, ConsultationRepositoryError> {
        let mut rows = lock(&self.rows);
        let taken = rows.values().any(|row| {
            row.user_id() == consultation.user_id
                && row.brand_id() == consultation.brand_id
                && row.occupies_slot()
        });
        if taken {
            self.slot_conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(ConsultationRepositoryError::duplicate_active(
                consultation.user_id,
                consultation.brand_id,
            ));
        }

        let id = ConsultationId::new(next_id(rows.len()))
            .map_err(|err| ConsultationRepositoryError::query(err.to_string()))?;
        let stored = consultation.clone().into_consultation(id);
        rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        consultation: &Consultation,
        expected_revision: u32,
    ) -> Result<(), ConsultationRepositoryError> {
        let mut rows = lock(&self.rows);
        let Some(stored) = rows.get_mut(&consultation.id()) else {
            return Err(ConsultationRepositoryError::query(format!(
                "consultation {} not found for update",
                consultation.id()
            )));
        };
        if stored.revision() != expected_revision {
            return Err(ConsultationRepositoryError::revision_mismatch(
                expected_revision,
                stored.revision(),
            ));
        }
        *stored = consultation.clone();
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError> {
        let rows = self.select(|row| row.user_id() == *user_id);
        Ok(paginate(rows, page))
    }

    async fn list_for_brands(
        &self,
        brand_ids: &[BrandId],
        page: PageRequest,
    ) -> Result<Page<Consultation>, ConsultationRepositoryError> {
        let rows = self.select(|row| brand_ids.contains(&row.brand_id()));
        Ok(paginate(rows, page))
    }

    async fn list_reschedule_requests(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Consultation>, ConsultationRepositoryError> {
        Ok(self.select(|row| {
            row.user_id() == *user_id
                && row.is_active()
                && row.status() == ConsultationStatus::RescheduleRequest
        }))
    }
}

/// User directory seeded by the test.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, UserSummary>>,
}

impl InMemoryUserDirectory {
    pub fn with_users(users: impl IntoIterator<Item = UserSummary>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|user| (user.id, user)).collect()),
        }
    }

    pub fn insert(&self, user: UserSummary) {
        lock(&self.users).insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, user_id: &UserId) -> Result<Option<UserSummary>, UserDirectoryError> {
        Ok(lock(&self.users).get(user_id).cloned())
    }
}

/// Brand directory seeded by the test.
#[derive(Default)]
pub struct InMemoryBrandDirectory {
    brands: Mutex<HashMap<BrandId, BrandSummary>>,
}

impl InMemoryBrandDirectory {
    pub fn with_brands(brands: impl IntoIterator<Item = BrandSummary>) -> Self {
        Self {
            brands: Mutex::new(brands.into_iter().map(|brand| (brand.id, brand)).collect()),
        }
    }

    pub fn insert(&self, brand: BrandSummary) {
        lock(&self.brands).insert(brand.id, brand);
    }
}

#[async_trait]
impl BrandDirectory for InMemoryBrandDirectory {
    async fn find_brand(
        &self,
        brand_id: &BrandId,
    ) -> Result<Option<BrandSummary>, BrandDirectoryError> {
        Ok(lock(&self.brands).get(brand_id).cloned())
    }

    async fn brands_managed_by(
        &self,
        manager_id: &ManagerId,
    ) -> Result<Vec<BrandId>, BrandDirectoryError> {
        let mut ids: Vec<BrandId> = lock(&self.brands)
            .values()
            .filter(|brand| brand.is_managed_by(*manager_id))
            .map(|brand| brand.id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// Notification store with a switch to make writes fail.
#[derive(Default)]
pub struct InMemoryNotificationRepository {
    rows: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `create` calls fail with a connection error.
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every stored notification, oldest first.
    pub fn all(&self) -> Vec<Notification> {
        lock(&self.rows).clone()
    }

    fn for_recipient(&self, recipient: &Recipient) -> Vec<Notification> {
        let mut rows: Vec<Notification> = lock(&self.rows)
            .iter()
            .filter(|row| row.recipient == *recipient)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, NotificationRepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationRepositoryError::connection(
                "notification store unavailable",
            ));
        }
        let mut rows = lock(&self.rows);
        let id = NotificationId::new(next_id(rows.len()))
            .map_err(|err| NotificationRepositoryError::query(err.to_string()))?;
        let stored = notification.clone().into_notification(id);
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|row| row.id == *notification_id)
            .cloned())
    }

    async fn list_for_recipient(
        &self,
        recipient: &Recipient,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        Ok(paginate(self.for_recipient(recipient), page))
    }

    async fn count_unread(&self, recipient: &Recipient) -> Result<u64, NotificationRepositoryError> {
        let unread = lock(&self.rows)
            .iter()
            .filter(|row| row.recipient == *recipient && !row.is_read)
            .count();
        Ok(unread as u64)
    }

    async fn mark_read(
        &self,
        notification_id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut rows = lock(&self.rows);
        let Some(row) = rows.iter_mut().find(|row| row.id == *notification_id) else {
            return Ok(false);
        };
        row.is_read = true;
        Ok(true)
    }

    async fn mark_all_read(
        &self,
        recipient: &Recipient,
    ) -> Result<u64, NotificationRepositoryError> {
        let mut updated = 0_u64;
        for row in lock(&self.rows)
            .iter_mut()
            .filter(|row| row.recipient == *recipient && !row.is_read)
        {
            row.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}

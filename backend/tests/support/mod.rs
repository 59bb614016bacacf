//! Shared world for consultation integration tests.
//!
//! Wires the lifecycle and inbox services onto the in-memory adapters with
//! a controllable clock. Notifications are written inline so assertions can
//! run as soon as an operation returns.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use consult_backend::domain::ports::{
    CancelConsultationRequest, ConfirmConsultationRequest, CreateConsultationRequest,
    ProposeRescheduleRequest, RespondToRescheduleRequest,
};
use consult_backend::domain::{
    Actor, BrandId, BrandSummary, ConsultationId, ConsultationLifecycleService, ManagerId,
    NotificationDispatcher, NotificationService, RescheduleProposal, UserId, UserResponse,
    UserSummary,
};
use consult_backend::inbound::http::state::{HttpState, HttpStatePorts};
use consult_backend::test_support::{
    InMemoryBrandDirectory, InMemoryConsultationRepository, InMemoryNotificationRepository,
    InMemoryUserDirectory, MutableClock,
};

pub type Lifecycle = ConsultationLifecycleService<
    InMemoryConsultationRepository,
    InMemoryUserDirectory,
    InMemoryBrandDirectory,
>;

pub const DANA: i64 = 1;
pub const ELI: i64 = 2;
pub const BLUE_BOTTLE: i64 = 10;
pub const RIVAL_BRAND: i64 = 20;
pub const BLUE_BOTTLE_MANAGER: i64 = 99;
pub const RIVAL_MANAGER: i64 = 77;

pub fn start_of_test() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 2, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub fn user(id: i64) -> UserId {
    UserId::new(id).expect("valid user id")
}

pub fn brand(id: i64) -> BrandId {
    BrandId::new(id).expect("valid brand id")
}

pub fn manager(id: i64) -> ManagerId {
    ManagerId::new(id).expect("valid manager id")
}

fn user_summary(id: i64, name: &str) -> UserSummary {
    UserSummary {
        id: user(id),
        name: name.to_owned(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: None,
    }
}

fn brand_summary(id: i64, name: &str, manager_id: i64) -> BrandSummary {
    BrandSummary {
        id: brand(id),
        name: name.to_owned(),
        category_name: Some("Cafe".to_owned()),
        manager_id: Some(manager(manager_id)),
    }
}

/// Services and the adapters behind them.
pub struct World {
    pub consultations: Arc<InMemoryConsultationRepository>,
    pub notifications: Arc<InMemoryNotificationRepository>,
    pub clock: Arc<MutableClock>,
    pub lifecycle: Arc<Lifecycle>,
    pub inbox: Arc<NotificationService<InMemoryNotificationRepository>>,
}

impl World {
    /// Two users, two brands, one manager per brand.
    pub fn new() -> Self {
        let consultations = Arc::new(InMemoryConsultationRepository::new());
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let users = Arc::new(InMemoryUserDirectory::with_users([
            user_summary(DANA, "Dana"),
            user_summary(ELI, "Eli"),
        ]));
        let brands = Arc::new(InMemoryBrandDirectory::with_brands([
            brand_summary(BLUE_BOTTLE, "Blue Bottle", BLUE_BOTTLE_MANAGER),
            brand_summary(RIVAL_BRAND, "Rival Roasters", RIVAL_MANAGER),
        ]));
        let clock = Arc::new(MutableClock::new(start_of_test()));

        let dispatcher = NotificationDispatcher::new(Arc::clone(&notifications), clock.clone());
        let lifecycle = Arc::new(ConsultationLifecycleService::new(
            Arc::clone(&consultations),
            users,
            brands,
            Arc::new(dispatcher),
            clock.clone(),
        ));
        let inbox = Arc::new(NotificationService::new(Arc::clone(&notifications)));

        Self {
            consultations,
            notifications,
            clock,
            lifecycle,
            inbox,
        }
    }

    /// HTTP state over the same services.
    pub fn http_state(&self) -> HttpState {
        HttpState::new(
            HttpStatePorts {
                consultations: self.lifecycle.clone(),
                consultations_query: self.lifecycle.clone(),
                notifications: self.inbox.clone(),
                notifications_query: self.inbox.clone(),
            },
            self.clock.clone(),
        )
    }
}

pub fn create_request(user_id: i64, brand_id: i64) -> CreateConsultationRequest {
    CreateConsultationRequest {
        user_id: user(user_id),
        brand_id: brand(brand_id),
        preferred_date: date(1, 10),
        preferred_time: time(10, 0),
    }
}

pub fn reschedule_request(
    consultation_id: ConsultationId,
    manager_id: i64,
) -> ProposeRescheduleRequest {
    ProposeRescheduleRequest {
        consultation_id,
        manager_id: manager(manager_id),
        proposal: RescheduleProposal {
            date: date(1, 12),
            time: time(14, 0),
            reason: Some("conflict".to_owned()),
            manager_note: Some("Afternoon works better".to_owned()),
        },
    }
}

pub fn confirm_request(
    consultation_id: ConsultationId,
    manager_id: i64,
) -> ConfirmConsultationRequest {
    ConfirmConsultationRequest {
        consultation_id,
        manager_id: manager(manager_id),
    }
}

pub fn respond_request(
    consultation_id: ConsultationId,
    user_id: i64,
    response: UserResponse,
) -> RespondToRescheduleRequest {
    RespondToRescheduleRequest {
        consultation_id,
        user_id: user(user_id),
        response,
    }
}

pub fn user_cancel(consultation_id: ConsultationId, user_id: i64) -> CancelConsultationRequest {
    CancelConsultationRequest {
        consultation_id,
        actor: Actor::User(user(user_id)),
    }
}

pub fn manager_cancel(
    consultation_id: ConsultationId,
    manager_id: i64,
) -> CancelConsultationRequest {
    CancelConsultationRequest {
        consultation_id,
        actor: Actor::Manager(manager(manager_id)),
    }
}

//! Diesel adapters against embedded PostgreSQL.
//!
//! Covers what only the database enforces: the partial unique index on the
//! active slot, revision-filtered updates and the listing SQL.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use consult_backend::domain::ports::{
    BrandDirectory, ConsultationRepository, ConsultationRepositoryError, NotificationRepository,
    UserDirectory,
};
use consult_backend::domain::{
    BrandId, Consultation, ConsultationId, ConsultationStatus, ManagerId, NewConsultation,
    NewNotification, Recipient, RescheduleProposal, UserId,
};
use consult_backend::outbound::persistence::{
    DbPool, DieselBrandDirectory, DieselConsultationRepository, DieselNotificationRepository,
    DieselUserDirectory, PoolConfig,
};
use pagination::PageRequest;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{handle_cluster_setup_failure, provision_database, shared_cluster};

struct TestContext {
    runtime: Runtime,
    consultations: DieselConsultationRepository,
    users: DieselUserDirectory,
    brands: DieselBrandDirectory,
    notifications: DieselNotificationRepository,
    _database: TemporaryDatabase,
}

fn seed_directory(url: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| err.to_string())?;
    client
        .batch_execute(concat!(
            "INSERT INTO users (id, name, email) VALUES ",
            "(1, 'Dana', 'dana@example.com'), (2, 'Eli', NULL);",
            "INSERT INTO brand_managers (id, name) VALUES (99, 'Morgan');",
            "INSERT INTO brand_categories (id, name) VALUES (3, 'Cafe');",
            "INSERT INTO brands (id, name, category_id, manager_id) VALUES ",
            "(10, 'Blue Bottle', 3, 99), (20, 'Rival Roasters', NULL, NULL);"
        ))
        .map_err(|err| err.to_string())
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_database(cluster)?;
    let url = database.url().to_string();
    seed_directory(&url)?;

    let config = PoolConfig::new(&url).with_max_size(2).with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        consultations: DieselConsultationRepository::new(pool.clone()),
        users: DieselUserDirectory::new(pool.clone()),
        brands: DieselBrandDirectory::new(pool.clone()),
        notifications: DieselNotificationRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 2, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn request(user_id: i64, brand_id: i64, created_at: DateTime<Utc>) -> NewConsultation {
    NewConsultation {
        user_id: UserId::new(user_id).expect("valid id"),
        brand_id: BrandId::new(brand_id).expect("valid id"),
        preferred_date: NaiveDate::from_ymd_opt(2025, 1, 10).expect("valid date"),
        preferred_time: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
        created_at,
    }
}

fn ids(consultations: &[Consultation]) -> Vec<ConsultationId> {
    consultations.iter().map(Consultation::id).collect()
}

#[rstest]
fn second_active_insert_hits_the_slot_index(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let first = ctx
            .consultations
            .insert(&request(1, 10, at(9)))
            .await
            .expect("first insert");
        assert_eq!(first.status(), ConsultationStatus::Pending);
        assert_eq!(first.revision(), 1);

        let error = ctx
            .consultations
            .insert(&request(1, 10, at(10)))
            .await
            .expect_err("slot taken");
        assert!(matches!(
            error,
            ConsultationRepositoryError::DuplicateActive {
                user_id: 1,
                brand_id: 10
            }
        ));

        let active = ctx
            .consultations
            .find_active_by_user_and_brand(&first.user_id(), &first.brand_id())
            .await
            .expect("lookup")
            .expect("active consultation");
        assert_eq!(active.id(), first.id());

        ctx.consultations
            .insert(&request(2, 10, at(10)))
            .await
            .expect("other user has their own slot");
    });
}

#[rstest]
fn cancelling_frees_the_slot(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let mut consultation = ctx
            .consultations
            .insert(&request(1, 10, at(9)))
            .await
            .expect("insert");
        consultation.cancel().expect("pending can be cancelled");
        ctx.consultations
            .update(&consultation, 1)
            .await
            .expect("update");

        let stored = ctx
            .consultations
            .find_by_id(&consultation.id())
            .await
            .expect("lookup")
            .expect("stored");
        assert_eq!(stored.status(), ConsultationStatus::Cancelled);
        assert!(!stored.is_active());
        assert_eq!(stored.revision(), 2);

        ctx.consultations
            .insert(&request(1, 10, at(10)))
            .await
            .expect("slot is free again");
    });
}

#[rstest]
fn stale_revision_is_reported(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let inserted = ctx
            .consultations
            .insert(&request(1, 10, at(9)))
            .await
            .expect("insert");
        let mut confirmed = inserted.clone();
        let mut cancelled = inserted;

        confirmed.confirm(at(11)).expect("pending can be confirmed");
        ctx.consultations
            .update(&confirmed, 1)
            .await
            .expect("first writer wins");

        cancelled.cancel().expect("pending can be cancelled");
        let error = ctx
            .consultations
            .update(&cancelled, 1)
            .await
            .expect_err("second writer is stale");
        assert!(matches!(
            error,
            ConsultationRepositoryError::RevisionMismatch {
                expected: 1,
                actual: 2
            }
        ));

        let stored = ctx
            .consultations
            .find_by_id(&confirmed.id())
            .await
            .expect("lookup")
            .expect("stored");
        assert_eq!(stored.status(), ConsultationStatus::Confirmed);
        assert_eq!(stored.confirmed_at(), Some(at(11)));
    });
}

#[rstest]
fn update_of_unknown_consultation_is_a_query_error(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let mut ghost = request(1, 10, at(9))
            .into_consultation(ConsultationId::new(4040).expect("valid id"));
        ghost.cancel().expect("pending can be cancelled");

        let error = ctx
            .consultations
            .update(&ghost, 1)
            .await
            .expect_err("no such row");
        assert!(matches!(error, ConsultationRepositoryError::Query { .. }));
    });
}

#[rstest]
fn listings_page_newest_first(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let mut oldest = ctx
            .consultations
            .insert(&request(1, 10, at(8)))
            .await
            .expect("insert");
        oldest.cancel().expect("cancel");
        ctx.consultations.update(&oldest, 1).await.expect("update");
        let middle = ctx
            .consultations
            .insert(&request(1, 20, at(9)))
            .await
            .expect("insert");
        let newest = ctx
            .consultations
            .insert(&request(1, 10, at(10)))
            .await
            .expect("insert");
        ctx.consultations
            .insert(&request(2, 10, at(11)))
            .await
            .expect("insert");

        let user = UserId::new(1).expect("valid id");
        let first = ctx
            .consultations
            .list_for_user(&user, PageRequest::new(0, 2).expect("valid page"))
            .await
            .expect("first page");
        assert_eq!(first.total_elements(), 3);
        assert_eq!(ids(first.items()), vec![newest.id(), middle.id()]);
        assert!(first.has_next());

        let second = ctx
            .consultations
            .list_for_user(&user, PageRequest::new(1, 2).expect("valid page"))
            .await
            .expect("second page");
        assert_eq!(ids(second.items()), vec![oldest.id()]);
        assert!(second.is_last());

        let brand_page = ctx
            .consultations
            .list_for_brands(
                &[BrandId::new(10).expect("valid id")],
                PageRequest::default(),
            )
            .await
            .expect("brand listing");
        assert_eq!(brand_page.total_elements(), 3);

        let nothing = ctx
            .consultations
            .list_for_brands(&[], PageRequest::default())
            .await
            .expect("empty listing");
        assert_eq!(nothing.total_elements(), 0);
    });
}

#[rstest]
fn reschedule_requests_come_from_the_proposal_columns(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let mut proposed = ctx
            .consultations
            .insert(&request(1, 10, at(9)))
            .await
            .expect("insert");
        ctx.consultations
            .insert(&request(1, 20, at(10)))
            .await
            .expect("insert");
        proposed
            .propose_reschedule(
                RescheduleProposal {
                    date: NaiveDate::from_ymd_opt(2025, 1, 12).expect("valid date"),
                    time: NaiveTime::from_hms_opt(14, 0, 0).expect("valid time"),
                    reason: Some("conflict".to_owned()),
                    manager_note: None,
                },
                at(11),
            )
            .expect("pending accepts a proposal");
        ctx.consultations.update(&proposed, 1).await.expect("update");

        let open = ctx
            .consultations
            .list_reschedule_requests(&UserId::new(1).expect("valid id"))
            .await
            .expect("listing");
        assert_eq!(ids(&open), vec![proposed.id()]);
        assert_eq!(open[0].adjustment_reason(), Some("conflict"));
        assert_eq!(open[0].adjustment_requested_at(), Some(at(11)));
    });
}

#[rstest]
fn directories_resolve_seeded_rows(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let dana = ctx
            .users
            .find_user(&UserId::new(1).expect("valid id"))
            .await
            .expect("lookup")
            .expect("seeded user");
        assert_eq!(dana.name, "Dana");

        let brand = ctx
            .brands
            .find_brand(&BrandId::new(10).expect("valid id"))
            .await
            .expect("lookup")
            .expect("seeded brand");
        assert_eq!(brand.category_name.as_deref(), Some("Cafe"));
        assert_eq!(brand.manager_id, Some(ManagerId::new(99).expect("valid id")));

        let managed = ctx
            .brands
            .brands_managed_by(&ManagerId::new(99).expect("valid id"))
            .await
            .expect("lookup");
        assert_eq!(managed, vec![BrandId::new(10).expect("valid id")]);
    });
}

#[rstest]
fn notifications_are_scoped_by_role(context: Option<TestContext>) {
    let Some(ctx) = context else { return };
    ctx.runtime.block_on(async {
        let consultation = ctx
            .consultations
            .insert(&request(1, 10, at(9)))
            .await
            .expect("insert");
        let user = Recipient::user(UserId::new(1).expect("valid id"));
        let same_numeric_manager = Recipient::manager(ManagerId::new(1).expect("valid id"));

        for recipient in [user, user, same_numeric_manager] {
            ctx.notifications
                .create(&NewNotification {
                    recipient,
                    consultation_id: consultation.id(),
                    status: ConsultationStatus::Pending,
                    message: "[Blue Bottle] received".to_owned(),
                    created_at: at(9),
                })
                .await
                .expect("create");
        }

        assert_eq!(ctx.notifications.count_unread(&user).await.expect("count"), 2);
        assert_eq!(ctx.notifications.mark_all_read(&user).await.expect("mark"), 2);
        assert_eq!(ctx.notifications.count_unread(&user).await.expect("count"), 0);
        assert_eq!(
            ctx.notifications
                .count_unread(&same_numeric_manager)
                .await
                .expect("count"),
            1
        );
    });
}

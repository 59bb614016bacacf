//! Embedded PostgreSQL for adapter integration tests.
//!
//! One cluster is shared per test binary. Each test gets its own database
//! cloned from a template that already carries the embedded migrations, so
//! the schema under test is exactly what the service applies at startup.
//!
//! Set `SKIP_TEST_CLUSTER=1` to skip these suites where PostgreSQL cannot
//! be started; otherwise a setup failure fails the test.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use consult_backend::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

const SHARED_CLUSTER_RETRIES: usize = 5;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const TEMPLATE_NAME: &str = "consult_template";

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static DATABASE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Truthy `SKIP_TEST_CLUSTER` values: "1", "true", "yes".
fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Keeps the generated superuser password stable when a data directory is
/// reused by a later test binary.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster spawns threads; the shared handle
        // serialises bootstrap.
        unsafe {
            std::env::set_var("PG_PASSWORD", "consult_embedded_test");
        }
    }
}

/// The process-wide cluster, bootstrapped on first use.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt} failed, retrying: {error:?}");
                std::thread::sleep(RETRY_DELAY);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

fn ensure_template(cluster: &ClusterHandle) -> Result<(), String> {
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(TEMPLATE_NAME)
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(TEMPLATE_NAME)
            .map_err(|err| format!("create template: {err:?}"))?;
    }
    // Pending migrations only; a template left by an earlier run catches up.
    let url = cluster.connection().database_url(TEMPLATE_NAME);
    run_migrations(&url).map_err(|err| format!("migrate template: {err}"))?;
    Ok(())
}

/// A fresh migrated database, dropped when the handle goes out of scope.
pub fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    ensure_template(cluster)?;
    let name = format!(
        "consult_test_{}_{}",
        std::process::id(),
        DATABASE_COUNTER.fetch_add(1, Ordering::SeqCst)
    );
    cluster
        .temporary_database_from_template(name.as_str(), TEMPLATE_NAME)
        .map_err(|err| format!("create database from template: {err:?}"))
}

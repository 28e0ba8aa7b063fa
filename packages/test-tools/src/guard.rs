//! Block accidental database access for the duration of one test body.
//!
//! The data-access path is a [`DatabaseConnection`]; the failing stand-in is
//! an empty `MockDatabase` connection, which returns a `DbErr` for every
//! query or statement instead of reaching a database. A process-wide
//! registry tracks which connections are stand-ins so other layers can
//! refuse to wrap them in transactions or pools.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

static DENIED: Lazy<Mutex<HashSet<usize>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Registry key for a stand-in connection.
///
/// Mock connections share one inner `Arc` across clones, so the pointer
/// survives moves and clones alike. Real connections have no key and are
/// never denied.
fn key(conn: &DatabaseConnection) -> Option<usize> {
    match conn {
        DatabaseConnection::MockDatabaseConnection(inner) => Some(Arc::as_ptr(inner) as usize),
        _ => None,
    }
}

/// Build a connection whose every query or statement fails.
pub fn no_database_conn() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

/// Scoped registration of a denied connection.
///
/// The stand-in is registered on construction and deregistered on `Drop`,
/// on every exit path, so a panicking test body cannot leave a stale entry
/// behind.
pub struct NoDatabaseGuard {
    conn: DatabaseConnection,
}

impl NoDatabaseGuard {
    pub fn new() -> Self {
        let conn = no_database_conn();
        if let Some(key) = key(&conn) {
            DENIED
                .lock()
                .expect("denied-connection registry poisoned")
                .insert(key);
        }
        Self { conn }
    }

    /// The failing stand-in connection. Clones keep the denied status.
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

impl Default for NoDatabaseGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoDatabaseGuard {
    fn drop(&mut self) {
        if let Some(key) = key(&self.conn) {
            // Never panic out of drop, even if the registry lock is poisoned.
            if let Ok(mut denied) = DENIED.lock() {
                denied.remove(&key);
            }
        }
    }
}

/// Returns true if this connection is a registered no-database stand-in.
pub fn is_no_database(conn: &DatabaseConnection) -> bool {
    match key(conn) {
        Some(key) => DENIED
            .lock()
            .expect("denied-connection registry poisoned")
            .contains(&key),
        None => false,
    }
}

/// Run a test body against the failing stand-in.
///
/// Any database access inside the body errors; the body's own outcome
/// (value, error, or panic) propagates unchanged, and the registry entry is
/// removed afterward regardless.
pub async fn with_no_database<F, Fut, T>(f: F) -> T
where
    F: FnOnce(DatabaseConnection) -> Fut,
    Fut: Future<Output = T>,
{
    let guard = NoDatabaseGuard::new();
    f(guard.conn().clone()).await
    // guard drops here, deregistering the stand-in
}

//! Helpers and wrappers that make testing against a SeaORM-backed
//! application more convenient: an object factory for creating model
//! instances without fixtures, a guard that guarantees the singleton site
//! row exists, a stand-in connection that blocks accidental database
//! access, a profiling wrapper for slow tests, and the config/plumbing for
//! connecting to a `test_`-prefixed database.

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod db;
pub mod diff;
pub mod entities;
pub mod error;
pub mod factory;
pub mod guard;
pub mod logging;
pub mod profiling;
pub mod site;

// Re-exports for public API
pub use db::{assert_test_db_name, connect_test_db, ensure_schema_ready, TestDbConfig};
pub use diff::{diff_models, has_diff};
pub use error::Error;
pub use factory::Factory;
pub use guard::{is_no_database, no_database_conn, with_no_database, NoDatabaseGuard};
pub use profiling::{profile, profile_async, ProfilerConfig};
pub use site::{ensure_site, with_site, SiteConfig};

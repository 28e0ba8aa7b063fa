//! Guarantee the singleton site row exists before a test body runs.

use std::env;
use std::future::Future;

use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};

use crate::entities::sites;
use crate::error::Error;

/// Configuration for the site row, passed explicitly rather than read from
/// ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub site_id: i32,
    pub domain: String,
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_id: 1,
            domain: "example.com".to_string(),
            name: "example.com".to_string(),
        }
    }
}

impl SiteConfig {
    /// Resolve the site id from `SITE_ID`, keeping the defaults otherwise.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        if let Ok(raw) = env::var("SITE_ID") {
            config.site_id = raw
                .parse()
                .map_err(|_| Error::config(format!("SITE_ID must be an integer, got '{raw}'")))?;
        }
        Ok(config)
    }
}

/// Idempotent get-or-create of the configured site row.
///
/// Looks the row up by id and inserts it only when absent, so repeated calls
/// across a test run leave exactly one row in place.
pub async fn ensure_site<C>(db: &C, config: &SiteConfig) -> Result<sites::Model, Error>
where
    C: ConnectionTrait,
{
    if let Some(existing) = sites::Entity::find_by_id(config.site_id).one(db).await? {
        return Ok(existing);
    }

    let site = sites::ActiveModel {
        id: Set(config.site_id),
        domain: Set(config.domain.clone()),
        name: Set(config.name.clone()),
    };
    Ok(site.insert(db).await?)
}

/// Run a test body with the site row guaranteed to exist.
pub async fn with_site<C, F, Fut, T>(db: &C, config: &SiteConfig, f: F) -> Result<T, Error>
where
    C: ConnectionTrait,
    F: FnOnce(sites::Model) -> Fut,
    Fut: Future<Output = T>,
{
    let site = ensure_site(db, config).await?;
    Ok(f(site).await)
}

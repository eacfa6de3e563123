//! Persistence collaborators for the import pipeline.
//!
//! [`OfferStore`] is the seam between the importer and storage. Two
//! implementations exist:
//!
//! - [`PgStore`] writes to PostgreSQL and is what `cli import` uses.
//! - [`MemoryStore`] keeps everything in process; it backs `cli import --dry-run`
//!   and the importer's unit tests.
//!
//! Both enforce uniqueness of city names and user emails at the storage layer.
//! Callers perform find-then-create without a transaction, so that constraint is
//! the only guard against duplicates when two imports race on the same key.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{City, NewCity, NewOffer, NewUser, Offer, User};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not connected")]
    NotConnected,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("{entity} with {key} `{value}` already exists")]
    Duplicate {
        entity: &'static str,
        key: &'static str,
        value: String,
    },
    #[error("invalid {entity}: {reason}")]
    Validation { entity: &'static str, reason: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn validation(entity: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            entity,
            reason: reason.into(),
        }
    }
}

/// Storage operations needed to import offers.
///
/// `connect` must be called before any other operation and `disconnect`
/// releases whatever `connect` acquired. Both are idempotent.
#[rocket::async_trait]
pub trait OfferStore: Send + Sync {
    async fn connect(&mut self) -> StoreResult<()>;

    async fn disconnect(&mut self) -> StoreResult<()>;

    async fn find_city_by_name(&self, name: &str) -> StoreResult<Option<City>>;

    async fn create_city(&self, city: NewCity) -> StoreResult<City>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn create_offer(&self, offer: NewOffer) -> StoreResult<Offer>;
}

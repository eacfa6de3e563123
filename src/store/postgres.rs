//! PostgreSQL-backed store.
//!
//! The free functions take a pool so Rocket handlers can share them with the
//! importer's [`PgStore`].

use crate::db::run_migrations;
use crate::models::{City, NewCity, NewOffer, NewUser, Offer, User};
use crate::store::{OfferStore, StoreError, StoreResult};
use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use rocket_db_pools::sqlx::{self, PgPool};
use std::str::FromStr;
use std::time::Duration;

const UNIQUE_VIOLATION: &str = "23505";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const CITY_COLUMNS: &str = "id, name, latitude, longitude, created_at, updated_at";

const USER_COLUMNS: &str = "id, name, email, avatar, user_type, created_at, updated_at";

pub(crate) const OFFER_COLUMNS: &str = "id, title, description, date, city, preview, images, \
     is_premium, is_favorite, rating, housing_type, bedrooms, guests, price, amenities, \
     author_id, latitude, longitude, comment_count, created_at, updated_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().map(|code| code == UNIQUE_VIOLATION).unwrap_or(false)
    )
}

fn map_insert_error(
    err: sqlx::Error,
    entity: &'static str,
    key: &'static str,
    value: &str,
) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Duplicate {
            entity,
            key,
            value: value.to_string(),
        }
    } else {
        StoreError::Database(err)
    }
}

pub async fn find_city_by_name(pool: &PgPool, name: &str) -> Result<Option<City>, sqlx::Error> {
    sqlx::query_as::<_, City>(&format!("SELECT {CITY_COLUMNS} FROM cities WHERE name = $1"))
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn list_cities(pool: &PgPool) -> Result<Vec<City>, sqlx::Error> {
    sqlx::query_as::<_, City>(&format!("SELECT {CITY_COLUMNS} FROM cities ORDER BY name ASC"))
        .fetch_all(pool)
        .await
}

pub async fn insert_city(pool: &PgPool, city: &NewCity) -> StoreResult<City> {
    sqlx::query_as::<_, City>(&format!(
        "INSERT INTO cities (name, latitude, longitude) VALUES ($1, $2, $3) RETURNING {CITY_COLUMNS}"
    ))
    .bind(&city.name)
    .bind(city.coordinates.latitude)
    .bind(city.coordinates.longitude)
    .fetch_one(pool)
    .await
    .map_err(|err| map_insert_error(err, "city", "name", &city.name))
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_user_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_user(pool: &PgPool, user: &NewUser) -> StoreResult<User> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (name, email, avatar, user_type) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.avatar.as_deref())
    .bind(user.user_type)
    .fetch_one(pool)
    .await
    .map_err(|err| map_insert_error(err, "user", "email", &user.email))
}

pub async fn insert_offer(pool: &PgPool, offer: &NewOffer) -> StoreResult<Offer> {
    let created = sqlx::query_as::<_, Offer>(&format!(
        r#"INSERT INTO offers (
               title, description, date, city, preview, images, is_premium, is_favorite,
               rating, housing_type, bedrooms, guests, price, amenities, author_id,
               latitude, longitude, comment_count
           )
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
           RETURNING {OFFER_COLUMNS}"#
    ))
    .bind(&offer.title)
    .bind(&offer.description)
    .bind(offer.date)
    .bind(&offer.city)
    .bind(&offer.preview)
    .bind(&offer.images)
    .bind(offer.is_premium)
    .bind(offer.is_favorite)
    .bind(offer.rating)
    .bind(offer.housing_type)
    .bind(offer.bedrooms)
    .bind(offer.guests)
    .bind(offer.price)
    .bind(&offer.amenities)
    .bind(offer.author_id)
    .bind(offer.coordinates.latitude)
    .bind(offer.coordinates.longitude)
    .bind(offer.comment_count)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn find_offer_by_id(pool: &PgPool, id: i32) -> Result<Option<Offer>, sqlx::Error> {
    sqlx::query_as::<_, Offer>(&format!("SELECT {OFFER_COLUMNS} FROM offers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_offers(pool: &PgPool, limit: i64) -> Result<Vec<Offer>, sqlx::Error> {
    sqlx::query_as::<_, Offer>(&format!(
        "SELECT {OFFER_COLUMNS} FROM offers ORDER BY date DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn list_favorite_offers(pool: &PgPool, user_id: i32) -> Result<Vec<Offer>, sqlx::Error> {
    let columns = OFFER_COLUMNS
        .split(", ")
        .map(|column| format!("o.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ");

    sqlx::query_as::<_, Offer>(&format!(
        r#"SELECT {columns}
           FROM offers o
           JOIN user_favorites f ON f.offer_id = o.id
           WHERE f.user_id = $1
           ORDER BY f.created_at DESC"#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Mark an offer as a favorite of the user. Adding twice is a no-op.
pub async fn add_favorite(pool: &PgPool, user_id: i32, offer_id: i32) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO user_favorites (user_id, offer_id)
           VALUES ($1, $2)
           ON CONFLICT (user_id, offer_id) DO NOTHING"#,
    )
    .bind(user_id)
    .bind(offer_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove_favorite(
    pool: &PgPool,
    user_id: i32,
    offer_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND offer_id = $2")
        .bind(user_id)
        .bind(offer_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// [`OfferStore`] over a lazily opened PostgreSQL pool.
///
/// `connect` opens the pool and applies pending migrations; `disconnect`
/// closes the pool.
pub struct PgStore {
    options: PgConnectOptions,
    max_connections: u32,
    pool: Option<PgPool>,
}

impl PgStore {
    pub fn new(database_url: &str) -> StoreResult<Self> {
        let options = PgConnectOptions::from_str(database_url)?;
        Ok(Self {
            options,
            max_connections: 5,
            pool: None,
        })
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    fn pool(&self) -> StoreResult<&PgPool> {
        self.pool.as_ref().ok_or(StoreError::NotConnected)
    }
}

#[rocket::async_trait]
impl OfferStore for PgStore {
    async fn connect(&mut self) -> StoreResult<()> {
        if self.pool.is_some() {
            return Ok(());
        }

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(self.options.clone())
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        run_migrations(&pool).await?;
        log::info!(
            "connected to database {}",
            self.options.get_database().unwrap_or("<default>")
        );

        self.pool = Some(pool);
        Ok(())
    }

    async fn disconnect(&mut self) -> StoreResult<()> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            log::info!("database connection closed");
        }
        Ok(())
    }

    async fn find_city_by_name(&self, name: &str) -> StoreResult<Option<City>> {
        Ok(find_city_by_name(self.pool()?, name).await?)
    }

    async fn create_city(&self, city: NewCity) -> StoreResult<City> {
        insert_city(self.pool()?, &city).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(find_user_by_email(self.pool()?, email).await?)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        insert_user(self.pool()?, &user).await
    }

    async fn create_offer(&self, offer: NewOffer) -> StoreResult<Offer> {
        insert_offer(self.pool()?, &offer).await
    }
}

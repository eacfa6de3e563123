//! Favorite offers of the current user.
//!
//! There is no session handling yet, so every request acts on behalf of
//! `AppConfig::mock_user_id`.

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{DataResponse, Offer};
use crate::store::postgres;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;
use sqlx::PgPool;

async fn current_user_id(pool: &PgPool, config: &AppConfig) -> Result<i32, ApiError> {
    let user_id = config.mock_user_id;
    match postgres::find_user_by_id(pool, user_id).await? {
        Some(_) => Ok(user_id),
        None => Err(ApiError::NotFound(format!("User {} not found", user_id))),
    }
}

async fn require_offer(pool: &PgPool, offer_id: i32) -> Result<Offer, ApiError> {
    postgres::find_offer_by_id(pool, offer_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Offer {} not found", offer_id)))
}

fn with_favorite(mut offer: Offer, is_favorite: bool) -> Offer {
    offer.is_favorite = is_favorite;
    offer
}

/// List the current user's favorite offers, most recently added first.
#[openapi(tag = "Favorites")]
#[get("/favorites")]
pub async fn list_favorites(
    pool: &State<PgPool>,
    config: &State<AppConfig>,
) -> Result<Json<DataResponse<Vec<Offer>>>, ApiError> {
    let user_id = current_user_id(pool.inner(), config.inner()).await?;
    let offers = postgres::list_favorite_offers(pool.inner(), user_id)
        .await?
        .into_iter()
        .map(|offer| with_favorite(offer, true))
        .collect();

    Ok(Json(DataResponse { data: offers }))
}

/// Add an offer to the current user's favorites. Adding twice is a no-op.
#[openapi(tag = "Favorites")]
#[post("/favorites/<offer_id>")]
pub async fn add_favorite(
    offer_id: i32,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
) -> Result<Json<Offer>, ApiError> {
    let offer = require_offer(pool.inner(), offer_id).await?;
    let user_id = current_user_id(pool.inner(), config.inner()).await?;

    postgres::add_favorite(pool.inner(), user_id, offer_id).await?;
    log::debug!("user {} favorited offer {}", user_id, offer_id);

    Ok(Json(with_favorite(offer, true)))
}

/// Remove an offer from the current user's favorites.
#[openapi(tag = "Favorites")]
#[delete("/favorites/<offer_id>")]
pub async fn remove_favorite(
    offer_id: i32,
    pool: &State<PgPool>,
    config: &State<AppConfig>,
) -> Result<Json<Offer>, ApiError> {
    let offer = require_offer(pool.inner(), offer_id).await?;
    let user_id = current_user_id(pool.inner(), config.inner()).await?;

    postgres::remove_favorite(pool.inner(), user_id, offer_id).await?;
    log::debug!("user {} unfavorited offer {}", user_id, offer_id);

    Ok(Json(with_favorite(offer, false)))
}

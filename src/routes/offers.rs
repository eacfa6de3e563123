use crate::error::ApiError;
use crate::models::{DataResponse, Offer};
use crate::routes::params::offer_limit;
use crate::store::postgres;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// List offers, newest first.
///
/// `limit` defaults to 60 and is clamped to `1..=100`.
#[openapi(tag = "Offers")]
#[get("/offers?<limit>")]
pub async fn list_offers(
    limit: Option<i64>,
    pool: &State<sqlx::PgPool>,
) -> Result<Json<DataResponse<Vec<Offer>>>, ApiError> {
    let offers = postgres::list_offers(pool.inner(), offer_limit(limit)).await?;
    Ok(Json(DataResponse { data: offers }))
}

/// Get a single offer by id
#[openapi(tag = "Offers")]
#[get("/offers/<offer_id>")]
pub async fn get_offer(
    offer_id: i32,
    pool: &State<sqlx::PgPool>,
) -> Result<Json<Offer>, ApiError> {
    postgres::find_offer_by_id(pool.inner(), offer_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Offer {} not found", offer_id)))
}

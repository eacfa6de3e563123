use crate::error::ApiError;
use crate::models::{City, DataResponse};
use crate::store::postgres;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// List every known city, alphabetically.
#[openapi(tag = "Cities")]
#[get("/cities")]
pub async fn list_cities(
    pool: &State<sqlx::PgPool>,
) -> Result<Json<DataResponse<Vec<City>>>, ApiError> {
    let cities = postgres::list_cities(pool.inner()).await?;
    Ok(Json(DataResponse { data: cities }))
}

//! HTTP route handlers grouped by resource.
//!
//! Handlers are annotated with `#[openapi]` so `rocket_okapi` can derive the
//! OpenAPI document served at `/api/v1/openapi.json`.

pub mod cities;
pub mod favorites;
pub mod health;
pub mod offers;
pub mod params;
pub mod users;

use crate::error::ApiError;
use crate::models::{NewUser, User, UserType};
use crate::store::postgres;
use rocket::State;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket_okapi::okapi::schemars::JsonSchema;
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    /// Accepted for client compatibility; credentials are not stored.
    pub password: Option<String>,
}

impl RegisterRequest {
    fn into_new_user(self) -> Result<NewUser, ApiError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();

        if name.is_empty() {
            return Err(ApiError::BadRequest("name must not be empty".to_string()));
        }
        if !is_plausible_email(&email) {
            return Err(ApiError::BadRequest(format!(
                "'{}' is not a valid email address",
                email
            )));
        }

        Ok(NewUser {
            name,
            email,
            avatar: self
                .avatar
                .map(|avatar| avatar.trim().to_string())
                .filter(|avatar| !avatar.is_empty()),
            user_type: self.user_type,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AuthStatus {
    pub status: String,
}

/// Register a new user
#[openapi(tag = "Users")]
#[post("/users", data = "<request>")]
pub async fn register_user(
    request: Json<RegisterRequest>,
    pool: &State<sqlx::PgPool>,
) -> Result<status::Created<Json<User>>, ApiError> {
    let new_user = request.into_inner().into_new_user()?;

    if postgres::find_user_by_email(pool.inner(), &new_user.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "User with email '{}' already exists",
            new_user.email
        )));
    }

    let user = postgres::insert_user(pool.inner(), &new_user).await?;
    log::info!("registered user {} <{}>", user.id, user.email);

    Ok(status::Created::new(format!("/api/v1/users/{}", user.id)).body(Json(user)))
}

/// Get a user by id
#[openapi(tag = "Users")]
#[get("/users/<user_id>")]
pub async fn get_user(user_id: i32, pool: &State<sqlx::PgPool>) -> Result<Json<User>, ApiError> {
    postgres::find_user_by_id(pool.inner(), user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", user_id)))
}

/// Session check. Every caller is reported as authenticated until real
/// authentication exists.
#[openapi(tag = "Users")]
#[get("/users/check-auth")]
pub fn check_auth() -> Json<AuthStatus> {
    Json(AuthStatus {
        status: "authenticated".to_string(),
    })
}

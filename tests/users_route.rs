use rocket::http::{ContentType, Status};
use rocket::routes;
use six_cities::models::{User, UserType};
use six_cities::routes::users::{check_auth, get_user, register_user};
use six_cities::test_support::{TestDatabase, TestRocketBuilder};

#[tokio::test]
async fn registers_and_fetches_user() {
    let Some(test_db) = TestDatabase::start_or_skip("user registration test").await else {
        return;
    };

    let client = TestRocketBuilder::new()
        .manage_pg_pool(test_db.pool_clone())
        .mount_api_routes(routes![register_user, get_user, check_auth])
        .async_client()
        .await;

    let response = client
        .post("/api/v1/users")
        .header(ContentType::JSON)
        .body(r#"{"name":"Ada","email":"ada@example.com","type":"pro","password":"secret"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let user: User = response.into_json().await.expect("user body");
    assert_eq!(user.name, "Ada");
    assert_eq!(user.user_type, UserType::Pro);
    assert_eq!(user.avatar, None);

    let response = client
        .get(format!("/api/v1/users/{}", user.id))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let fetched: User = response.into_json().await.expect("user body");
    assert_eq!(fetched.email, "ada@example.com");

    let response = client.get("/api/v1/users/424242").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    drop(response);

    drop(client);
    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn rejects_duplicate_and_invalid_registrations() {
    let Some(test_db) = TestDatabase::start_or_skip("user validation test").await else {
        return;
    };

    let client = TestRocketBuilder::new()
        .manage_pg_pool(test_db.pool_clone())
        .mount_api_routes(routes![register_user])
        .async_client()
        .await;

    let register = |body: &'static str| {
        client
            .post("/api/v1/users")
            .header(ContentType::JSON)
            .body(body)
    };

    let response = register(r#"{"name":"Ada","email":"ada@example.com"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    drop(response);

    let response = register(r#"{"name":"Other","email":"ada@example.com"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);
    drop(response);

    let response = register(r#"{"name":"","email":"bo@example.com"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    drop(response);

    let response = register(r#"{"name":"Bo","email":"bo.example.com"}"#)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    drop(response);

    drop(client);
    test_db.close().await.expect("failed to drop test database");
}

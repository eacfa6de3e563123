#[macro_use]
extern crate rocket;

pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod import;
pub mod models;
pub mod request_logger;
pub mod routes;
pub mod store;

use crate::config::{AppConfig, ConfigError};
use crate::db::SixCitiesDb;
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::fs::{FileServer, Options};
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_db_pools::Database;
use rocket_okapi::{
    openapi_get_routes,
    rapidoc::{GeneralConfig, HideShowConfig, RapiDocConfig, make_rapidoc},
    settings::UrlObject,
    swagger_ui::{SwaggerUIConfig, make_swagger_ui},
};
use std::sync::Once;

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        env_logger::Builder::from_env(
            Env::default().default_filter_or("info,rocket::server=warn,rocket::request=warn"),
        )
        .init();
    });
}

fn cors() -> Result<rocket_cors::Cors, rocket_cors::Error> {
    CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Patch,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allow_credentials(true)
        .to_cors()
}

/// Layer the application's database URL and port over `base`.
///
/// The URL is merged only when it was set through the environment, so a
/// database configured in `Rocket.toml` or `ROCKET_DATABASES` survives.
fn figment_for(base: Figment, config: &Result<AppConfig, ConfigError>) -> Figment {
    let Ok(config) = config else {
        return base;
    };

    let figment = match config.database.explicit_url() {
        Some(url) => base.merge(("databases.six_cities_db.url", url)),
        None => base,
    };

    match config.port {
        Some(port) => figment.merge(("port", port)),
        None => figment,
    }
}

pub fn rocket() -> Rocket<Build> {
    init_logger();
    config::load_dotenv();

    let app_config = AppConfig::from_env();
    let figment = figment_for(rocket::Config::figment(), &app_config);
    let static_dir = app_config
        .as_ref()
        .map(|config| config.static_dir.clone())
        .unwrap_or_else(|_| "public".into());

    let mut rocket = rocket::custom(figment)
        .attach(RequestLogger)
        .attach(SixCitiesDb::init());

    match cors() {
        Ok(cors) => rocket = rocket.attach(cors),
        Err(err) => {
            let message = err.to_string();
            rocket = rocket.attach(AdHoc::try_on_ignite("CORS", |rocket| async move {
                log::error!("invalid CORS configuration: {}", message);
                Err(rocket)
            }));
        }
    }

    rocket
        .attach(AdHoc::try_on_ignite(
            "Application Config",
            |rocket| async move {
                let config = match app_config {
                    Ok(config) => config,
                    Err(err) => {
                        log::error!("invalid configuration: {}", err);
                        return Err(rocket);
                    }
                };

                if let Err(err) = std::fs::create_dir_all(&config.upload_dir) {
                    log::error!(
                        "failed to create upload directory {}: {}",
                        config.upload_dir.display(),
                        err
                    );
                    return Err(rocket);
                }

                log::info!(
                    "starting in {} mode, uploads at {}",
                    config.environment,
                    config.upload_dir.display()
                );
                let uploads = FileServer::new(&config.upload_dir, Options::None);
                Ok(rocket.mount("/upload", uploads).manage(config))
            },
        ))
        // Run database migrations on startup
        .attach(AdHoc::try_on_ignite(
            "Run Migrations",
            |rocket| async move {
                match SixCitiesDb::fetch(&rocket) {
                    Some(db) => {
                        let pool = (**db).clone();
                        match db::run_migrations(&pool).await {
                            Ok(_) => {
                                log::info!("database migrations successful");
                                Ok(rocket)
                            }
                            Err(e) => {
                                log::error!("database migrations failed: {}", e);
                                Err(rocket)
                            }
                        }
                    }
                    None => {
                        log::error!("database pool not available for migrations");
                        Err(rocket)
                    }
                }
            },
        ))
        // Handlers take the pool as plain managed state
        .attach(AdHoc::try_on_ignite("Manage DB Pool", |rocket| async move {
            match SixCitiesDb::fetch(&rocket) {
                Some(db) => {
                    let pool = (**db).clone();
                    Ok(rocket.manage(pool))
                }
                None => Err(rocket),
            }
        }))
        .mount("/api/v1", api_routes())
        .mount(
            "/static",
            FileServer::new(static_dir, Options::Index | Options::Missing),
        )
        .mount(
            "/api/docs/swagger/",
            make_swagger_ui(&SwaggerUIConfig {
                url: "../../v1/openapi.json".to_owned(),
                ..Default::default()
            }),
        )
        .mount(
            "/api/docs/rapidoc/",
            make_rapidoc(&RapiDocConfig {
                general: GeneralConfig {
                    spec_urls: vec![UrlObject::new("Six Cities API", "../../v1/openapi.json")],
                    ..Default::default()
                },
                hide_show: HideShowConfig {
                    allow_spec_url_load: false,
                    allow_spec_file_load: false,
                    ..Default::default()
                },
                ..Default::default()
            }),
        )
}

/// All `/api/v1` routes plus the generated `openapi.json`.
pub fn api_routes() -> Vec<rocket::Route> {
    openapi_get_routes![
        // Health
        routes::health::health_check,
        // Cities
        routes::cities::list_cities,
        // Offers
        routes::offers::list_offers,
        routes::offers::get_offer,
        // Users
        routes::users::register_user,
        routes::users::get_user,
        routes::users::check_auth,
        // Favorites
        routes::favorites::list_favorites,
        routes::favorites::add_favorite,
        routes::favorites::remove_favorite,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB_URL_KEY: &str = "databases.six_cities_db.url";

    fn rocket_toml_figment() -> Figment {
        Figment::from(rocket::Config::default())
            .merge((DB_URL_KEY, "postgres://prod-host:5432/listings"))
    }

    #[test]
    fn rocket_database_settings_survive_default_config() {
        let config = AppConfig::from_lookup(|_| None);
        let figment = figment_for(rocket_toml_figment(), &config);

        let url: String = figment.extract_inner(DB_URL_KEY).expect("database url");
        assert_eq!(url, "postgres://prod-host:5432/listings");
    }

    #[test]
    fn explicit_database_variables_override_rocket_settings() {
        let config = AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://env-host/six_cities".to_string()),
            "PORT" => Some("9090".to_string()),
            _ => None,
        });
        let figment = figment_for(rocket_toml_figment(), &config);

        let url: String = figment.extract_inner(DB_URL_KEY).expect("database url");
        assert_eq!(url, "postgres://env-host/six_cities");
        let port: u16 = figment.extract_inner("port").expect("port");
        assert_eq!(port, 9090);
    }
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::config::AppConfig;
    use crate::models::{Coordinates, HousingType, NewOffer, NewUser, Offer, User, UserType};
    use crate::store::{StoreResult, postgres};
    use chrono::{DateTime, Utc};
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use rocket_db_pools::sqlx::PgPool;

    pub use database::{TestDatabase, TestDatabaseError};

    /// Seeds users and offers through the same queries the application uses.
    pub struct TestFixtures<'a> {
        pool: &'a PgPool,
    }

    impl<'a> TestFixtures<'a> {
        pub fn new(pool: &'a PgPool) -> Self {
            Self { pool }
        }

        pub async fn insert_user(&self, name: &str, email: &str) -> StoreResult<User> {
            postgres::insert_user(
                self.pool,
                &NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    avatar: None,
                    user_type: UserType::Normal,
                },
            )
            .await
        }

        /// Insert a Paris apartment owned by `author_id`.
        pub async fn insert_offer(
            &self,
            author_id: i32,
            title: &str,
            date: DateTime<Utc>,
        ) -> StoreResult<Offer> {
            postgres::insert_offer(
                self.pool,
                &NewOffer {
                    title: title.to_string(),
                    description: format!("{} description", title),
                    date,
                    city: "Paris".to_string(),
                    preview: "preview.jpg".to_string(),
                    images: vec!["a.jpg".to_string(), "b.jpg".to_string()],
                    is_premium: false,
                    is_favorite: false,
                    rating: 4.2,
                    housing_type: HousingType::Apartment,
                    bedrooms: 2,
                    guests: 3,
                    price: 150,
                    amenities: vec!["Washer".to_string()],
                    author_id,
                    coordinates: Coordinates {
                        latitude: 48.85661,
                        longitude: 2.351499,
                    },
                    comment_count: 0,
                },
            )
            .await
        }
    }

    pub mod database {
        use crate::db::MIGRATOR;
        use log::LevelFilter;
        use rocket_db_pools::sqlx::postgres::{PgConnectOptions, PgPoolOptions};
        use rocket_db_pools::sqlx::{self, ConnectOptions, PgPool};
        use testcontainers::{
            ContainerAsync, ImageExt, core::error::TestcontainersError, runners::AsyncRunner,
        };
        use testcontainers_modules::postgres::Postgres;
        use thiserror::Error;
        use tokio::runtime::Handle;
        use uuid::Uuid;

        #[derive(Debug, Error)]
        pub enum TestDatabaseError {
            #[error("database error: {0}")]
            Sqlx(#[from] sqlx::Error),
            #[error("migration error: {0}")]
            Migration(#[from] sqlx::migrate::MigrateError),
            #[error("container error: {0}")]
            Container(#[from] TestcontainersError),
        }

        /// Ephemeral, migrated database inside a disposable Postgres container.
        pub struct TestDatabase {
            pool: Option<PgPool>,
            admin_options: PgConnectOptions,
            database_name: String,
            url: String,
            container: Option<ContainerAsync<Postgres>>,
        }

        impl TestDatabase {
            pub async fn new() -> Result<Self, TestDatabaseError> {
                let container = Postgres::default().with_tag("16-alpine").start().await?;

                let host = container.get_host().await?.to_string();
                let port = container.get_host_port_ipv4(5432).await?;
                let server_url = format!("postgres://postgres:postgres@{}:{}", host, port);

                let admin_options: PgConnectOptions = format!("{}/postgres", server_url)
                    .parse::<PgConnectOptions>()?
                    .log_statements(LevelFilter::Off);

                let admin_pool = PgPoolOptions::new()
                    .max_connections(1)
                    .connect_with(admin_options.clone())
                    .await?;

                let database_name = format!("six_cities_{}", Uuid::new_v4().simple());
                sqlx::query(&format!("CREATE DATABASE \"{}\"", database_name))
                    .execute(&admin_pool)
                    .await?;
                admin_pool.close().await;

                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .connect_with(admin_options.clone().database(&database_name))
                    .await?;

                MIGRATOR.run(&pool).await?;

                Ok(Self {
                    pool: Some(pool),
                    admin_options,
                    url: format!("{}/{}", server_url, database_name),
                    database_name,
                    container: Some(container),
                })
            }

            /// Provision a database, or print why not and return `None` when no
            /// container runtime is reachable.
            pub async fn start_or_skip(test_name: &str) -> Option<Self> {
                match Self::new().await {
                    Ok(db) => Some(db),
                    Err(TestDatabaseError::Container(err)) => {
                        eprintln!("skipping {test_name}: container runtime unavailable ({err})");
                        None
                    }
                    Err(err) => panic!("failed to provision test database: {err:?}"),
                }
            }

            pub fn pool(&self) -> &PgPool {
                self.pool.as_ref().expect("test database pool is available")
            }

            pub fn pool_clone(&self) -> PgPool {
                self.pool().clone()
            }

            /// Connection URL of the test database, for clients that open their own pool.
            pub fn url(&self) -> &str {
                &self.url
            }

            /// Empty every table while keeping the schema.
            pub async fn reset(&self) -> Result<(), TestDatabaseError> {
                sqlx::query(
                    "TRUNCATE user_favorites, offers, users, cities RESTART IDENTITY CASCADE",
                )
                .execute(self.pool())
                .await?;
                Ok(())
            }

            pub async fn close(mut self) -> Result<(), TestDatabaseError> {
                if let Some(pool) = self.pool.take() {
                    pool.close().await;
                }

                drop_database(self.admin_options.clone(), &self.database_name).await?;

                if let Some(container) = self.container.take() {
                    drop(container);
                }

                Ok(())
            }
        }

        async fn drop_database(
            admin_options: PgConnectOptions,
            database_name: &str,
        ) -> Result<(), sqlx::Error> {
            let admin_pool = PgPoolOptions::new()
                .max_connections(1)
                .connect_with(admin_options)
                .await?;

            sqlx::query(&format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", database_name))
                .execute(&admin_pool)
                .await?;
            admin_pool.close().await;
            Ok(())
        }

        impl Drop for TestDatabase {
            fn drop(&mut self) {
                if let Some(pool) = self.pool.take() {
                    let admin_options = self.admin_options.clone();
                    let db_name = self.database_name.clone();
                    if let Ok(handle) = Handle::try_current() {
                        handle.spawn(async move {
                            pool.close().await;
                            let _ = drop_database(admin_options, &db_name).await;
                        });
                    }
                }

                if let Some(container) = self.container.take() {
                    drop(container);
                }
            }
        }
    }

    /// Builder for constructing Rocket instances tailored for integration tests.
    #[derive(Default)]
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        pg_pool: Option<PgPool>,
        app_config: Option<AppConfig>,
    }

    impl TestRocketBuilder {
        /// Random port, logging disabled.
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                ..Default::default()
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        pub fn manage_pg_pool(mut self, pool: PgPool) -> Self {
            self.pg_pool = Some(pool);
            self
        }

        /// Manage an [`AppConfig`] built from defaults with the given mock user.
        pub fn manage_app_config(mut self, mock_user_id: i32) -> Self {
            let mut config = AppConfig::from_lookup(|_| None)
                .expect("default configuration is valid");
            config.mock_user_id = mock_user_id;
            self.app_config = Some(config);
            self
        }

        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(pool) = self.pg_pool {
                rocket = rocket.manage(pool);
            }

            if let Some(config) = self.app_config {
                rocket = rocket.manage(config);
            }

            rocket
        }

        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }
}

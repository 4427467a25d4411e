//! Shopfront API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use shopfront_core::AppError;
use shopfront_infrastructure::{
    PostgresAuditStore, PostgresBrandGateway, PostgresCategoryGateway, PostgresOrderGateway,
    PostgresProductGateway, PostgresUserAddressGateway, PostgresUserRepository,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let bootstrap_token = required_env("AUTH_BOOTSTRAP_TOKEN")?;
    let session_secret = required_env("SESSION_SECRET")?;

    if session_secret.len() < 32 {
        return Err(AppError::Validation(
            "SESSION_SECRET must be at least 32 characters".to_owned(),
        ));
    }

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let app_state = AppState {
        product_gateway: Arc::new(PostgresProductGateway::new(pool.clone())),
        order_gateway: Arc::new(PostgresOrderGateway::new(pool.clone())),
        category_gateway: Arc::new(PostgresCategoryGateway::new(pool.clone())),
        brand_gateway: Arc::new(PostgresBrandGateway::new(pool.clone())),
        address_gateway: Arc::new(PostgresUserAddressGateway::new(pool.clone())),
        audit_store: Arc::new(PostgresAuditStore::new(pool.clone())),
        user_repository: Arc::new(PostgresUserRepository::new(pool)),
        frontend_url: frontend_url.clone(),
        bootstrap_token,
    };

    let api_routes = Router::new()
        .route(
            "/api/products",
            get(handlers::products::list_products_handler)
                .post(handlers::products::create_product_handler),
        )
        .route(
            "/api/products/{id}",
            get(handlers::products::get_product_handler)
                .put(handlers::products::update_product_handler)
                .delete(handlers::products::delete_product_handler),
        )
        .route(
            "/api/products/delete-many",
            post(handlers::products::delete_products_handler),
        )
        .route(
            "/api/orders",
            get(handlers::orders::list_orders_handler)
                .post(handlers::orders::create_order_handler),
        )
        .route(
            "/api/orders/{id}",
            get(handlers::orders::get_order_handler)
                .put(handlers::orders::update_order_handler)
                .delete(handlers::orders::delete_order_handler),
        )
        .route(
            "/api/orders/delete-many",
            post(handlers::orders::delete_orders_handler),
        )
        .route(
            "/api/categories",
            get(handlers::categories::list_categories_handler)
                .post(handlers::categories::create_category_handler),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::categories::get_category_handler)
                .put(handlers::categories::update_category_handler)
                .delete(handlers::categories::delete_category_handler),
        )
        .route(
            "/api/categories/delete-many",
            post(handlers::categories::delete_categories_handler),
        )
        .route(
            "/api/brands",
            get(handlers::brands::list_brands_handler)
                .post(handlers::brands::create_brand_handler),
        )
        .route(
            "/api/brands/{id}",
            get(handlers::brands::get_brand_handler)
                .put(handlers::brands::update_brand_handler)
                .delete(handlers::brands::delete_brand_handler),
        )
        .route(
            "/api/brands/delete-many",
            post(handlers::brands::delete_brands_handler),
        )
        .route(
            "/api/addresses",
            get(handlers::addresses::list_addresses_handler)
                .post(handlers::addresses::create_address_handler),
        )
        .route(
            "/api/addresses/{id}",
            get(handlers::addresses::get_address_handler)
                .put(handlers::addresses::update_address_handler)
                .delete(handlers::addresses::delete_address_handler),
        )
        .route(
            "/api/audit-logs",
            get(handlers::audit_logs::list_audit_logs_handler),
        );

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .merge(api_routes)
        .route_layer(from_fn_with_state(app_state.clone(), middleware::load_subject))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "shopfront-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

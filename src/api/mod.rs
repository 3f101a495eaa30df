use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::Config;
use crate::db::Store;
use crate::search::TitleSearchIndex;
use crate::services::{
    AuthService, CatalogService, LibraryService, SeaOrmAuthService, SeaOrmCatalogService,
    SeaOrmLibraryService,
};

pub mod auth;
mod error;
mod library;
mod observability;
mod titles;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub catalog_service: Arc<dyn CatalogService>,

    pub library_service: Arc<dyn LibraryService>,

    pub auth_service: Arc<dyn AuthService>,

    pub session_store: SqliteStore,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

/// Opens the database and wires every service.
pub async fn create_app_state(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let session_store = SqliteStore::new(store.conn.get_sqlite_connection_pool().clone());
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to prepare session store: {e}"))?;

    let search = TitleSearchIndex::new(config.search.max_edit_distance);

    let catalog_service =
        Arc::new(SeaOrmCatalogService::new(store.clone(), search)) as Arc<dyn CatalogService>;
    let library_service =
        Arc::new(SeaOrmLibraryService::new(store.clone(), search)) as Arc<dyn LibraryService>;
    let auth_service = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.clone(),
    )) as Arc<dyn AuthService>;

    Ok(Arc::new(AppState {
        config,
        store,
        catalog_service,
        library_service,
        auth_service,
        session_store,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(state.session_store.clone())
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/session", get(auth::check_session))
        .route("/health", get(observability::health))
        .layer(session_layer)
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/titles",
            get(titles::list_titles).post(titles::create_title),
        )
        .route(
            "/titles/{id}",
            get(titles::get_title)
                .put(titles::update_title)
                .delete(titles::delete_title),
        )
        .route("/titles/{id}/names", get(titles::list_names))
        .route(
            "/titles/{id}/aliases",
            post(titles::add_alias).delete(titles::remove_aliases),
        )
        .route(
            "/names",
            get(titles::find_name).post(titles::resolve_name),
        )
        .route(
            "/library",
            get(library::get_progress).post(library::add_to_library),
        )
        .route("/library/{id}/episode", put(library::set_episode))
        .route("/library/{id}/status", put(library::set_status))
        .route(
            "/library/{id}",
            axum::routing::delete(library::remove_from_library),
        )
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

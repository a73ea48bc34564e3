use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::telegram::TelegramClient;
use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod bot;
mod characters;
mod error;
mod instances;
mod observability;
mod parties;
mod profile;
mod statistics;
mod system;
mod types;
mod users;
mod visits;

pub use error::ApiError;
pub use types::*;

use tokio::sync::RwLock;

use crate::services::{
    AuthService, CharacterService, PartyService, PeriodService, StatisticsService, VisitService,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn telegram(&self) -> &Option<Arc<TelegramClient>> {
        &self.shared.telegram
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn period_service(&self) -> &Arc<dyn PeriodService> {
        &self.shared.period_service
    }

    #[must_use]
    pub fn visit_service(&self) -> &Arc<dyn VisitService> {
        &self.shared.visit_service
    }

    #[must_use]
    pub fn statistics_service(&self) -> &Arc<dyn StatisticsService> {
        &self.shared.statistics_service
    }

    #[must_use]
    pub fn character_service(&self) -> &Arc<dyn CharacterService> {
        &self.shared.character_service
    }

    #[must_use]
    pub fn party_service(&self) -> &Arc<dyn PartyService> {
        &self.shared.party_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, trust_header_auth) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.telegram.trust_header_auth,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let mut api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/telegram", post(auth::telegram_login))
        .route("/auth/webapp", post(auth::webapp_login))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/set-password", post(auth::set_password))
        .route("/instances", get(instances::list_instances))
        .route("/instances/{zone_id}", get(instances::get_instance))
        .route(
            "/statistics/user/{telegram_id}",
            get(statistics::get_player_statistics),
        )
        .route("/statistics/global", get(statistics::get_global_statistics))
        .route(
            "/statistics/zone/{zone_id}",
            get(statistics::get_zone_statistics),
        )
        .route("/statistics/periods", get(statistics::list_periods))
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics));

    if trust_header_auth {
        api_router = api_router.merge(bot::router());
    }

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/health", get(system::health))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::track_metrics))
        .with_state(state)
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/visits/me", get(visits::list_my_visits))
        .route("/visits/{zone_id}", post(visits::mark_visit))
        .route("/visits/{zone_id}", delete(visits::remove_visit))
        .route("/statistics/me", get(statistics::get_my_statistics))
        .route("/profile", get(profile::get_profile))
        .route("/profile", put(profile::update_profile))
        .route("/characters", get(characters::list_characters))
        .route("/characters", post(characters::create_character))
        .route("/characters/{id}", put(characters::update_character))
        .route("/characters/{id}", delete(characters::delete_character))
        .route("/parties", post(parties::create_party))
        .route("/parties/me", get(parties::list_my_parties))
        .route("/users", get(users::list_users))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

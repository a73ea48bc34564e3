//! Smoke tests for the core web flows used by the mini-app frontend:
//! zone catalog, profile, user directory, and period bootstrap.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use raidlog::config::Config;
use raidlog::services::PeriodService;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<raidlog::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("raidlog-smoke-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.telegram.bot_token = "123456:TEST_TOKEN".to_string();
    config.telegram.trust_header_auth = true;

    let state = raidlog::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");

    let router = raidlog::api::router(state.clone()).await;
    (state, router)
}

async fn ensure_user(app: &Router, telegram_id: i64, username: &str) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/bot/ensure-user")
                .header("content-type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({ "telegram_id": telegram_id, "username": username })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn get_json(app: &Router, uri: &str, telegram_id: Option<i64>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = telegram_id {
        builder = builder.header("X-Telegram-Id", id.to_string());
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_, app) = spawn_app().await;

    let (status, body) = get_json(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_zone_catalog_is_seeded_and_ordered() {
    let (_, app) = spawn_app().await;

    let (status, body) = get_json(&app, "/api/instances", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let zones = body["data"].as_array().expect("zone list");
    assert_eq!(zones.len(), 12);

    for zone in zones {
        assert!(zone["zone_id"].as_str().is_some());
        assert!(zone["name"].as_str().is_some());
    }

    // Catalog is ordered by level ascending.
    let levels: Vec<i64> = zones
        .iter()
        .map(|zone| zone["level"].as_i64().expect("zone level"))
        .collect();
    let mut sorted = levels.clone();
    sorted.sort_unstable();
    assert_eq!(levels, sorted);

    let ids: Vec<&str> = zones
        .iter()
        .map(|zone| zone["zone_id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"zaken_daytime"));
    assert!(ids.contains(&"antharas"));
}

#[tokio::test]
async fn test_zone_catalog_lookup() {
    let (_, app) = spawn_app().await;

    let (status, body) = get_json(&app, "/api/instances/antharas", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Antharas");
    assert_eq!(body["data"]["boss_name"], "Antharas");

    let (status, body) = get_json(&app, "/api/instances/nonexistent_zone", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Instance zone not found");
}

#[tokio::test]
async fn test_lazy_period_creation_is_stable() {
    let (state, _) = spawn_app().await;

    // Nothing exists until the first read asks for the active period.
    assert_eq!(state.store().count_active_periods().await.unwrap(), 0);

    let first = state.period_service().current_period().await.unwrap();
    assert!(first.is_active);
    assert_eq!(state.store().count_active_periods().await.unwrap(), 1);

    // Repeat calls return the same period instead of opening another.
    let second = state.period_service().current_period().await.unwrap();
    assert_eq!(first.period_id, second.period_id);
    assert_eq!(state.store().count_active_periods().await.unwrap(), 1);
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let (_, app) = spawn_app().await;
    ensure_user(&app, 601, "profile_owner").await;

    let (status, body) = get_json(&app, "/api/profile", Some(601)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["telegram_id"], 601);
    assert_eq!(body["data"]["username"], "profile_owner");
    assert_eq!(body["data"]["timezone"], "UTC");
    assert_eq!(body["data"]["character_name"], serde_json::Value::Null);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/profile")
                .header("X-Telegram-Id", "601")
                .header("content-type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({ "character_name": "Shillien Templar" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = get_json(&app, "/api/profile", Some(601)).await;
    assert_eq!(body["data"]["character_name"], "Shillien Templar");
}

#[tokio::test]
async fn test_user_directory_includes_rosters() {
    let (_, app) = spawn_app().await;
    ensure_user(&app, 602, "first_player").await;
    ensure_user(&app, 603, "second_player").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/characters")
                .header("X-Telegram-Id", "602")
                .header("content-type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(
                    serde_json::json!({
                        "nickname": "DarkAvenger",
                        "profession": "Dark Avenger",
                        "level": 78
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (status, body) = get_json(&app, "/api/users", Some(602)).await;
    assert_eq!(status, StatusCode::OK);

    let players = body["data"].as_array().expect("player list");
    assert_eq!(players.len(), 2);

    let with_roster = players
        .iter()
        .find(|player| player["telegram_id"] == serde_json::json!(602))
        .expect("player 602 listed");
    let characters = with_roster["characters"].as_array().expect("roster");
    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0]["nickname"], "DarkAvenger");

    let without_roster = players
        .iter()
        .find(|player| player["telegram_id"] == serde_json::json!(603))
        .expect("player 603 listed");
    assert_eq!(without_roster["characters"], serde_json::json!([]));
}

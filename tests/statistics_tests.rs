//! Integration tests for the statistics rollups: per-user, global,
//! per-zone, and the all-time leaderboard.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use raidlog::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("raidlog-stats-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.telegram.bot_token = "123456:TEST_TOKEN".to_string();
    config.telegram.trust_header_auth = true;

    let state = raidlog::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    raidlog::api::router(state).await
}

async fn ensure_user(app: &Router, telegram_id: i64, username: &str) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/bot/ensure-user")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "telegram_id": telegram_id,
                        "username": username
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn mark_visit(app: &Router, telegram_id: i64, zone_id: &str) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/visits/{zone_id}"))
                .header("X-Telegram-Id", telegram_id.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_user_statistics_completion_rate() {
    let app = spawn_app().await;
    ensure_user(&app, 444, "completionist").await;

    for zone in ["zaken_daytime", "antharas", "valakas"] {
        mark_visit(&app, 444, zone).await;
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/statistics/me")
                .header("X-Telegram-Id", "444")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let current = &body_json["data"]["current_period"];

    // 3 of the 12 seeded zones.
    assert_eq!(current["visited"], serde_json::json!(3));
    assert_eq!(current["total"], serde_json::json!(12));
    assert_eq!(current["available"], serde_json::json!(9));
    assert_eq!(current["completion_rate"], serde_json::json!(25.0));
    assert_eq!(current["visits"].as_array().map(Vec::len), Some(3));

    let all_time = &body_json["data"]["all_time"];
    assert_eq!(all_time["total_visits"], serde_json::json!(3));
    assert_eq!(all_time["zone_stats"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_global_statistics_across_users() {
    let app = spawn_app().await;
    ensure_user(&app, 555, "first").await;
    ensure_user(&app, 666, "second").await;

    mark_visit(&app, 555, "zaken_daytime").await;
    mark_visit(&app, 555, "antharas").await;
    mark_visit(&app, 666, "zaken_daytime").await;

    let (status, body_json) = get_json(&app, "/api/statistics/global").await;
    assert_eq!(status, StatusCode::OK);

    let current = &body_json["data"]["current_period"];
    assert_eq!(current["total_visits"], serde_json::json!(3));
    assert_eq!(current["active_users"], serde_json::json!(2));
    assert_eq!(current["total_users"], serde_json::json!(2));
    assert_eq!(current["average_visits_per_user"], serde_json::json!(1.5));

    let popularity = current["zone_popularity"].as_array().expect("popularity");
    assert_eq!(popularity.len(), 10);
    assert_eq!(popularity[0]["zone_id"], "zaken_daytime");
    assert_eq!(popularity[0]["visits"], serde_json::json!(2));

    // Untouched zones still show up, at zero.
    assert!(
        popularity
            .iter()
            .any(|zone| zone["visits"] == serde_json::json!(0))
    );

    let all_time = &body_json["data"]["all_time"];
    assert_eq!(all_time["total_visits"], serde_json::json!(3));
    assert_eq!(
        all_time["most_popular_zones"][0]["zone_id"],
        "zaken_daytime"
    );
}

#[tokio::test]
async fn test_zone_statistics() {
    let app = spawn_app().await;
    ensure_user(&app, 777, "soloist").await;
    mark_visit(&app, 777, "frintezza").await;

    let (status, body_json) = get_json(&app, "/api/statistics/zone/frintezza").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body_json["data"]["zone"]["zone_id"], "frintezza");
    assert_eq!(body_json["data"]["zone"]["name"], "Frintezza");
    assert_eq!(
        body_json["data"]["current_period"]["visits"],
        serde_json::json!(1)
    );
    assert_eq!(
        body_json["data"]["current_period"]["visitors"][0]["telegram_id"],
        serde_json::json!(777)
    );
    assert_eq!(
        body_json["data"]["all_time"]["total_visits"],
        serde_json::json!(1)
    );
    assert_eq!(
        body_json["data"]["all_time"]["top_visitors"][0]["total_visits"],
        serde_json::json!(1)
    );

    let (status, body_json) = get_json(&app, "/api/statistics/zone/nothing_here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body_json["success"], serde_json::json!(false));
}

#[tokio::test]
async fn test_player_statistics_public_lookup() {
    let app = spawn_app().await;
    ensure_user(&app, 888, "raider").await;
    mark_visit(&app, 888, "baium").await;

    // No identity header; this lookup is public.
    let (status, body_json) = get_json(&app, "/api/statistics/user/888").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body_json["data"]["user"]["telegram_id"], serde_json::json!(888));
    assert_eq!(body_json["data"]["user"]["username"], "raider");
    assert_eq!(
        body_json["data"]["current_period"]["visited"],
        serde_json::json!(1)
    );

    let (status, _) = get_json(&app, "/api/statistics/user/999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_top_players_leaderboard() {
    let app = spawn_app().await;
    ensure_user(&app, 891, "steady").await;
    ensure_user(&app, 892, "grinder").await;

    mark_visit(&app, 891, "zaken_daytime").await;
    mark_visit(&app, 891, "baium").await;

    mark_visit(&app, 892, "zaken_daytime").await;
    mark_visit(&app, 892, "antharas").await;
    mark_visit(&app, 892, "valakas").await;

    let (status, body_json) = get_json(&app, "/api/bot/top-players").await;
    assert_eq!(status, StatusCode::OK);

    let players = body_json["data"].as_array().expect("leaderboard");
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["telegram_id"], serde_json::json!(892));
    assert_eq!(players[0]["total_visits"], serde_json::json!(3));
    assert_eq!(players[1]["telegram_id"], serde_json::json!(891));
    assert_eq!(players[1]["total_visits"], serde_json::json!(2));
}

//! Integration tests for the visit lifecycle: marking, duplicates,
//! removal, and period rotation semantics.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use raidlog::config::Config;
use raidlog::services::{PeriodService, VisitError, VisitService};
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<raidlog::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("raidlog-visit-test-{}.db", uuid::Uuid::new_v4()));

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

async fn mark_visit(app: &Router, telegram_id: i64, zone_id: &str) -> StatusCode {
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
    response.status()
}

async fn my_statistics(app: &Router, telegram_id: i64) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/statistics/me")
                .header("X-Telegram-Id", telegram_id.to_string())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_mark_duplicate_and_remove_visit() {
    let (_, app) = spawn_app().await;
    ensure_user(&app, 111, "runner").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visits/zaken_daytime")
                .header("X-Telegram-Id", "111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["data"]["zone_id"], "zaken_daytime");
    assert_eq!(body_json["data"]["zone_name"], "Zaken (Daytime)");

    // One completion per zone per period.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visits/zaken_daytime")
                .header("X-Telegram-Id", "111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body_json["error"],
        "Already visited this zone in current period"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/visits/me")
                .header("X-Telegram-Id", "111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["data"].as_array().map(Vec::len), Some(1));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/visits/zaken_daytime")
                .header("X-Telegram-Id", "111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/visits/me")
                .header("X-Telegram-Id", "111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["data"], serde_json::json!([]));

    // Removing twice finds nothing the second time.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/visits/zaken_daytime")
                .header("X-Telegram-Id", "111")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_visit_unknown_zone() {
    let (_, app) = spawn_app().await;
    ensure_user(&app, 112, "lost").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/visits/black_abyss")
                .header("X-Telegram-Id", "112")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["error"], "Instance zone not found");
}

#[tokio::test]
async fn test_removal_keeps_all_time_counters() {
    let (_, app) = spawn_app().await;
    ensure_user(&app, 333, "farmer").await;

    assert_eq!(mark_visit(&app, 333, "baium").await, StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/visits/baium")
                .header("X-Telegram-Id", "333")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stats = my_statistics(&app, 333).await;
    assert_eq!(
        stats["data"]["current_period"]["visited"],
        serde_json::json!(0)
    );
    assert_eq!(
        stats["data"]["all_time"]["total_visits"],
        serde_json::json!(1)
    );

    // The period slot is free again; the counter keeps growing.
    assert_eq!(mark_visit(&app, 333, "baium").await, StatusCode::OK);

    let stats = my_statistics(&app, 333).await;
    assert_eq!(
        stats["data"]["current_period"]["visited"],
        serde_json::json!(1)
    );
    assert_eq!(
        stats["data"]["all_time"]["total_visits"],
        serde_json::json!(2)
    );
}

#[tokio::test]
async fn test_rotation_resets_period_and_keeps_counters() {
    let (state, app) = spawn_app().await;
    ensure_user(&app, 222, "veteran").await;

    assert_eq!(mark_visit(&app, 222, "zaken_daytime").await, StatusCode::OK);
    assert_eq!(mark_visit(&app, 222, "antharas").await, StatusCode::OK);

    let outcome = state
        .period_service()
        .rotate()
        .await
        .expect("rotation should succeed");
    assert_eq!(outcome.closed_periods, 1);
    assert!(outcome.new_period.is_active);

    // Fresh period, empty slate.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/visits/me")
                .header("X-Telegram-Id", "222")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["data"], serde_json::json!([]));

    // The same zone is markable again and counters carried over.
    assert_eq!(mark_visit(&app, 222, "zaken_daytime").await, StatusCode::OK);

    let stats = my_statistics(&app, 222).await;
    assert_eq!(
        stats["data"]["current_period"]["visited"],
        serde_json::json!(1)
    );
    assert_eq!(
        stats["data"]["all_time"]["total_visits"],
        serde_json::json!(3)
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/statistics/periods")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let periods = body_json["data"].as_array().expect("period list");
    assert_eq!(periods.len(), 2);

    let active: Vec<_> = periods
        .iter()
        .filter(|period| period["is_active"] == serde_json::json!(true))
        .collect();
    assert_eq!(active.len(), 1);

    let closed: Vec<_> = periods
        .iter()
        .filter(|period| period["is_active"] == serde_json::json!(false))
        .collect();
    assert_eq!(closed.len(), 1);
    assert!(closed[0]["end_date"].is_string());
}

#[tokio::test]
async fn test_concurrent_marks_have_single_winner() {
    let (state, app) = spawn_app().await;
    ensure_user(&app, 333, "racer").await;

    let user = state
        .store()
        .get_user_by_telegram_id(333)
        .await
        .unwrap()
        .expect("user exists");
    let zone = state
        .store()
        .get_zone_by_key("baium")
        .await
        .unwrap()
        .expect("zone seeded");

    let service = state.visit_service();
    let (first, second) = tokio::join!(
        service.mark_visit(user.id, "baium"),
        service.mark_visit(user.id, "baium"),
    );

    let results = [first, second];
    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|result| matches!(result, Err(VisitError::AlreadyVisited)))
    );

    // The unique index arbitrated the race; the counter moved once.
    let stat = state
        .store()
        .get_zone_stat(user.id, zone.id)
        .await
        .unwrap()
        .expect("stat row created by the winner");
    assert_eq!(stat.total_visits, 1);
}

#[tokio::test]
async fn test_concurrent_period_creation_yields_one_active() {
    let (state, _app) = spawn_app().await;
    let service = state.period_service();

    let (first, second) = tokio::join!(service.current_period(), service.current_period());

    let first = first.expect("lazy creation");
    let second = second.expect("lazy creation");
    assert_eq!(first.period_id, second.period_id);
    assert!(first.is_active);

    assert_eq!(state.store().count_active_periods().await.unwrap(), 1);
}

//! Integration tests for the sushida-scores HTTP API server.
//!
//! These tests use axum-test to make requests against the router without starting a real server.

mod common;

use axum::http::StatusCode;
use common::{RESULT_JSON, TestApp, new_score};
use axum_test::TestServer;
use serde_json::{Value, json};
use sushida_scores_server::server::{CorsConfig, router};

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("ok");

    Ok(())
}

#[tokio::test]
async fn test_cors_follows_config() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let cors = CorsConfig {
        enabled: true,
        allow_origins: vec!["http://localhost:5173".into()],
        ..CorsConfig::default()
    };
    let server = TestServer::new(router(app.state.clone()).layer(cors.layer()))?;

    let allowed = server
        .get("/health")
        .add_header("origin", "http://localhost:5173")
        .await;
    assert_eq!(
        allowed.maybe_header("access-control-allow-origin"),
        Some("http://localhost:5173".parse()?)
    );

    let other = server
        .get("/health")
        .add_header("origin", "http://evil.example")
        .await;
    assert!(other.maybe_header("access-control-allow-origin").is_none());

    let disabled = TestServer::new(router(app.state.clone()).layer(CorsConfig::default().layer()))?;
    let response = disabled
        .get("/health")
        .add_header("origin", "http://localhost:5173")
        .await;
    assert!(response.maybe_header("access-control-allow-origin").is_none());

    Ok(())
}

// =============================================================================
// Score CRUD Tests
// =============================================================================

#[tokio::test]
async fn test_list_defaults_to_newest_first() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add_score("2025-01-16", "お手軽", 100).await;
    app.add_score("2025-01-15", "お手軽", 200).await;
    app.add_score("2025-01-17", "高級", -300).await;

    let body: Vec<Value> = app.server.get("/api/v1/scores").await.json();
    let dates: Vec<&str> = body.iter().filter_map(|r| r["date"].as_str()).collect();
    assert_eq!(dates, vec!["2025-01-17", "2025-01-16", "2025-01-15"]);

    Ok(())
}

#[tokio::test]
async fn test_list_sort_and_filters() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add_score("2025-01-15", "お手軽", 100).await;
    app.add_score("2025-01-16", "お手軽", -50).await;
    app.add_score("2025-01-17", "高級", 900).await;
    app.add_score("2025-01-20", "お手軽", 400).await;

    let body: Vec<Value> = app
        .server
        .get("/api/v1/scores")
        .add_query_param("sort", "result")
        .add_query_param("order", "asc")
        .await
        .json();
    let results: Vec<i64> = body.iter().filter_map(|r| r["result"].as_i64()).collect();
    assert_eq!(results, vec![-50, 100, 400, 900]);

    // Course and date range apply together
    let body: Vec<Value> = app
        .server
        .get("/api/v1/scores")
        .add_query_param("course", "お手軽")
        .add_query_param("from", "2025-01-16")
        .add_query_param("to", "2025-01-18")
        .await
        .json();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["result"], -50);

    Ok(())
}

#[tokio::test]
async fn test_invalid_query_parameters() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .get("/api/v1/scores")
        .add_query_param("sort", "speed")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_QUERY");
    assert_eq!(body["error"]["details"]["parameter"], "sort");

    let response = app
        .server
        .get("/api/v1/series")
        .add_query_param("from", "2025-13-01")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_DATE");

    Ok(())
}

#[tokio::test]
async fn test_get_update_delete_score() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    let id = app.add_score("2025-01-10", "普通", 250).await;
    app.add_score("2025-01-12", "普通", 10).await;

    let response = app.server.get(&format!("/api/v1/scores/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["typing"]["avarageTPS"], 2.5);

    let response = app
        .server
        .patch(&format!("/api/v1/scores/{}", id))
        .json(&json!({ "date": "2025-01-20", "result": -1000 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["result"], -1000);
    assert_eq!(body["course"], "普通");

    // The edited record moved to its new date position
    let listed: Vec<Value> = app
        .server
        .get("/api/v1/scores")
        .add_query_param("order", "asc")
        .await
        .json();
    assert_eq!(listed[1]["id"], id.as_str());

    app.server
        .delete(&format!("/api/v1/scores/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = app.server.get(&format!("/api/v1/scores/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "SCORE_NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_unknown_id_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    app.server
        .patch("/api/v1/scores/missing")
        .json(&json!({ "result": 1 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .delete("/api/v1/scores/missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_malformed_create_body() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/scores")
        .json(&json!({ "course": "お手軽" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_JSON");

    Ok(())
}

#[tokio::test]
async fn test_import_result_json() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app
        .server
        .post("/api/v1/scores/import")
        .content_type("application/json")
        .text(RESULT_JSON)
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["result"], 600);
    assert!(body["date"].as_str().is_some());

    let response = app
        .server
        .post("/api/v1/scores/import")
        .text("{\"course\": ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_JSON");

    let listed: Vec<Value> = app.server.get("/api/v1/scores").await.json();
    assert_eq!(listed.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_clear_scores() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add_score("2025-01-10", "普通", 1).await;
    app.add_score("2025-01-11", "普通", 2).await;

    let body: Value = app.server.delete("/api/v1/scores").await.json();
    assert_eq!(body["count"], 2);

    let listed: Vec<Value> = app.server.get("/api/v1/scores").await.json();
    assert!(listed.is_empty());

    Ok(())
}

// =============================================================================
// Statistics and Series Tests
// =============================================================================

#[tokio::test]
async fn test_empty_statistics() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let body: Value = app.server.get("/api/v1/statistics").await.json();
    assert_eq!(body["totalGames"], 0);
    assert_eq!(body["bestScore"], 0);
    assert_eq!(body["averageAccuracy"], 0.0);

    let body: Value = app.server.get("/api/v1/statistics/courses").await.json();
    assert_eq!(body, json!({}));

    Ok(())
}

#[tokio::test]
async fn test_statistics_by_course() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add_score("2025-01-10", "お手軽", -1200).await;
    app.add_score("2025-01-11", "お手軽", 600).await;
    app.add_score("2025-01-12", "高級", -2400).await;
    app.add_score("2025-01-13", "高級", 1000).await;

    let body: Value = app.server.get("/api/v1/statistics").await.json();
    assert_eq!(body["totalGames"], 4);
    assert_eq!(body["bestScore"], 1000);
    assert_eq!(body["worstScore"], -2400);
    assert_eq!(body["averageScore"], -500.0);

    let body: Value = app
        .server
        .get("/api/v1/statistics")
        .add_query_param("course", "高級")
        .await
        .json();
    assert_eq!(body["totalGames"], 2);

    // A course without results falls back to every result
    let body: Value = app
        .server
        .get("/api/v1/statistics")
        .add_query_param("course", "普通")
        .await
        .json();
    assert_eq!(body["totalGames"], 4);

    let body: Value = app.server.get("/api/v1/statistics/courses").await.json();
    assert_eq!(body["お手軽"]["totalGames"], 2);
    assert_eq!(body["高級"]["bestScore"], 1000);

    let courses: Vec<String> = app.server.get("/api/v1/courses").await.json();
    assert_eq!(courses, vec!["お手軽", "高級"]);

    Ok(())
}

#[tokio::test]
async fn test_series_per_course() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    for (date, course, result) in [
        ("2025-01-13", "高級", 3),
        ("2025-01-11", "お手軽", 1),
        ("2025-01-12", "高級", 2),
        ("2025-01-10", "お手軽", 0),
    ] {
        app.server
            .post("/api/v1/scores")
            .json(&new_score(date, course, result))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Vec<Value> = app.server.get("/api/v1/series").await.json();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["id"], "お手軽");
    assert_eq!(
        body[0]["data"],
        json!([{ "x": "2025-01-10", "y": 0 }, { "x": "2025-01-11", "y": 1 }])
    );

    let body: Vec<Value> = app
        .server
        .get("/api/v1/series")
        .add_query_param("course", "高級")
        .add_query_param("to", "2025-01-12")
        .await
        .json();
    assert_eq!(body, vec![json!({ "id": "高級", "data": [{ "x": "2025-01-12", "y": 2 }] })]);

    Ok(())
}

#[tokio::test]
async fn test_seed_samples() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.post("/api/v1/scores/samples").await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["count"], 30);

    let body: Value = app.server.get("/api/v1/statistics").await.json();
    assert_eq!(body["totalGames"], 30);

    Ok(())
}

// =============================================================================
// Demo Mode Tests
// =============================================================================

#[tokio::test]
async fn test_demo_mode_swaps_reads_and_blocks_writes() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.add_score("2025-01-10", "お手軽", 1).await;

    let body: Value = app
        .server
        .put("/api/v1/demo")
        .json(&json!({ "enabled": true }))
        .await
        .json();
    assert_eq!(body["enabled"], true);

    let listed: Vec<Value> = app.server.get("/api/v1/scores").await.json();
    assert_eq!(listed.len(), 30);
    assert!(listed.iter().all(|r| r["id"].as_str().is_some_and(|id| id.starts_with("demo-"))));

    let response = app
        .server
        .post("/api/v1/scores")
        .json(&new_score("2025-01-11", "お手軽", 2))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "DEMO_MODE_ACTIVE");

    app.server
        .put("/api/v1/demo")
        .json(&json!({ "enabled": false }))
        .await
        .assert_status_ok();
    let listed: Vec<Value> = app.server.get("/api/v1/scores").await.json();
    assert_eq!(listed.len(), 1);

    let body: Value = app.server.get("/api/v1/demo").await.json();
    assert_eq!(body["enabled"], false);

    Ok(())
}

// =============================================================================
// Ingestion Tests
// =============================================================================

#[tokio::test]
async fn test_ingest_refuses_foreign_directory() -> anyhow::Result<()> {
    let app = TestApp::with_results(&[("20250115.json", RESULT_JSON)])?;
    let foreign = app.temp_dir.path().join("private");
    std::fs::create_dir(&foreign)?;
    std::fs::write(foreign.join("20250301.json"), RESULT_JSON)?;

    let response = app
        .server
        .post("/api/v1/ingest")
        .json(&json!({ "directory": foreign }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INGEST_DIRECTORY_FORBIDDEN");

    let response = app
        .server
        .post("/api/v1/ingest")
        .json(&json!({ "directory": app.temp_dir.path().join("score") }))
        .await;
    response.assert_status_ok();

    let listed: Vec<Value> = app.server.get("/api/v1/scores").await.json();
    let ids: Vec<&str> = listed.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["cli-20250115"]);

    Ok(())
}

#[tokio::test]
async fn test_startup_ingestion_runs_once() -> anyhow::Result<()> {
    let app = TestApp::with_results(&[
        ("20250115.json", RESULT_JSON),
        ("notes.txt", "not a result"),
        ("broken.json", "{"),
    ])?;

    let body: Value = app.server.get("/api/v1/ingest/status").await.json();
    assert_eq!(body["state"], "pending");

    app.state.ingest_on_startup().await;
    app.state.ingest_on_startup().await;

    let body: Value = app.server.get("/api/v1/ingest/status").await.json();
    assert_eq!(body, json!({ "state": "complete", "inserted": 1, "replaced": 0 }));

    let body: Value = app.server.get("/api/v1/scores/cli-20250115").await.json();
    assert_eq!(body["date"], "2025-01-15");
    assert_eq!(body["course"], "お手軽");

    Ok(())
}

#[tokio::test]
async fn test_ingest_endpoint_is_idempotent() -> anyhow::Result<()> {
    let app = TestApp::with_results(&[
        ("sushida_result_20250201_101500.json", RESULT_JSON),
        ("2025-02-03.json", RESULT_JSON),
        ("broken.json", "[]"),
    ])?;

    let response = app.server.post("/api/v1/ingest").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["skipped"][0]["filename"], "broken.json");

    let body: Value = app.server.post("/api/v1/ingest").await.json();
    assert_eq!(body["inserted"], 0);
    assert_eq!(body["replaced"], 2);

    let listed: Vec<Value> = app.server.get("/api/v1/scores").await.json();
    let ids: Vec<&str> = listed.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["cli-2025-02-03", "cli-sushida_result_20250201_101500"]);

    Ok(())
}

#[tokio::test]
async fn test_ingest_without_directory() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    // The fixture's configured directory does not exist: nothing to merge
    let body: Value = app.server.post("/api/v1/ingest").await.json();
    assert_eq!(body["inserted"], 0);

    let response = app
        .server
        .post("/api/v1/ingest")
        .json(&json!({ "directory": app.temp_dir.path().join("elsewhere") }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/api/v1/ingest")
        .text("directory please")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

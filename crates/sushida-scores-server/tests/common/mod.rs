//! Common test utilities and fixtures.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;
use sushida_scores_server::server::{AppState, Config, IngestConfig, StoreConfig, router};

// =============================================================================
// Result Payloads
// =============================================================================

/// A result as the extraction tool writes it.
pub const RESULT_JSON: &str = r#"{
    "course": "お手軽",
    "result": 600,
    "detail": { "payed": 3000, "gain": 3600 },
    "typing": { "correct": 58, "avarageTPS": 1.2, "miss": 8 }
}"#;

/// A score creation body.
pub fn new_score(date: &str, course: &str, result: i64) -> Value {
    json!({
        "date": date,
        "course": course,
        "result": result,
        "detail": { "payed": 5000, "gain": 5000 + result },
        "typing": { "correct": 100, "avarageTPS": 2.5, "miss": 10 }
    })
}

// =============================================================================
// Test Application
// =============================================================================

/// Test application wrapper that manages a temporary store.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub temp_dir: TempDir, // Keep alive for test duration
}

impl TestApp {
    /// Create a new test application with a fresh temporary store.
    pub fn new() -> anyhow::Result<Self> {
        Self::build(|_| Ok(()))
    }

    /// Create a test application whose ingest directory holds `files`.
    pub fn with_results(files: &[(&str, &str)]) -> anyhow::Result<Self> {
        Self::build(|dir| {
            let results = dir.join("score");
            std::fs::create_dir_all(&results)?;
            for (name, content) in files {
                std::fs::write(results.join(name), content)?;
            }
            Ok(())
        })
    }

    fn build(
        prepare: impl FnOnce(&std::path::Path) -> std::io::Result<()>,
    ) -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        prepare(temp_dir.path())?;

        let config = Config {
            store: StoreConfig {
                path: temp_dir.path().join("store").to_string_lossy().into(),
            },
            ingest: IngestConfig {
                directory: Some(temp_dir.path().join("score").to_string_lossy().into()),
            },
            ..Config::default()
        };
        let state = AppState::from_config(&config)?;
        let server = TestServer::new(router(state.clone()))?;
        Ok(Self {
            server,
            state,
            temp_dir,
        })
    }

    /// Create a score and return its id.
    pub async fn add_score(&self, date: &str, course: &str, result: i64) -> String {
        let response = self
            .server
            .post("/api/v1/scores")
            .json(&new_score(date, course, result))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_str().unwrap_or_default().to_string()
    }
}

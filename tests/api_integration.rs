mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{ScriptedAnalyzer, controller_with};
use sentence_flow::AppState;
use sentence_flow::analysis::AnalysisError;
use sentence_flow::server::build_router;
use serde_json::{Value, json};

async fn server_with(analyzer: Arc<ScriptedAnalyzer>) -> TestServer {
    let (controller, _) = controller_with(analyzer).await;
    let state = AppState { controller };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_and_initial_state() {
    let server = server_with(Arc::new(ScriptedAnalyzer::new())).await;

    server.get("/health").await.assert_text("ok");

    let body: Value = server.get("/api/state").await.json();
    assert_eq!(body["state"]["isInitialState"], true);
    assert_eq!(body["state"]["isLoading"], false);
    assert_eq!(body["panel"]["panel"], "welcome");
    assert_eq!(body["history"], json!([]));
    assert_eq!(body["theme"], "light");
}

#[tokio::test]
async fn test_set_sentence_then_analyze() {
    let analyzer = Arc::new(ScriptedAnalyzer::new());
    let server = server_with(analyzer.clone()).await;

    let body: Value = server
        .put("/api/sentence")
        .json(&json!({"sentence": "The cat sat."}))
        .await
        .json();
    assert_eq!(body["state"]["sentence"], "The cat sat.");
    assert_eq!(analyzer.calls(), 0);

    let response = server.post("/api/analyze").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["outcome"], "completed");
    assert_eq!(body["panel"]["panel"], "ready");
    assert_eq!(body["panel"]["grammar"]["status"], "no_issues");
    assert_eq!(body["state"]["result"]["grammarCheck"], json!([]));
    assert_eq!(body["history"][0]["sentence"], "The cat sat.");
}

#[tokio::test]
async fn test_analyze_with_override_and_blank() {
    let analyzer = Arc::new(ScriptedAnalyzer::new());
    let server = server_with(analyzer.clone()).await;

    let body: Value = server
        .post("/api/analyze")
        .json(&json!({"sentence": "   "}))
        .await
        .json();
    assert_eq!(body["outcome"], "skipped");
    assert_eq!(body["state"]["isLoading"], false);
    assert_eq!(analyzer.calls(), 0);

    let body: Value = server
        .post("/api/analyze")
        .json(&json!({"sentence": "The dog ran."}))
        .await
        .json();
    assert_eq!(body["outcome"], "completed");
    assert_eq!(analyzer.sentences().await, ["The dog ran."]);
}

#[tokio::test]
async fn test_analyze_failure_surfaces_message() {
    let analyzer = Arc::new(ScriptedAnalyzer::with_responses([Err(AnalysisError::Service {
        status: 500,
        message: "boom".to_string(),
    })]));
    let server = server_with(analyzer).await;

    let body: Value = server
        .post("/api/analyze")
        .json(&json!({"sentence": "The cat sat."}))
        .await
        .json();
    assert_eq!(body["outcome"], "failed");
    assert_eq!(body["panel"]["panel"], "error");
    assert_eq!(body["panel"]["message"], "API Error: 500 boom");
    assert_eq!(body["state"]["result"], Value::Null);
}

#[tokio::test]
async fn test_history_endpoints() {
    let analyzer = Arc::new(ScriptedAnalyzer::new());
    let server = server_with(analyzer.clone()).await;

    for s in ["One.", "Two."] {
        server
            .post("/api/analyze")
            .json(&json!({"sentence": s}))
            .await
            .assert_status_ok();
    }
    let body: Value = server.get("/api/state").await.json();
    let one_id = body["history"][1]["id"].as_str().unwrap().to_string();
    assert_eq!(body["history"][1]["sentence"], "One.");

    let body: Value = server
        .post(&format!("/api/history/{one_id}/select"))
        .await
        .json();
    assert_eq!(body["state"]["sentence"], "One.");
    assert_eq!(analyzer.calls(), 2);

    server
        .post("/api/history/unknown/select")
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let body: Value = server.delete("/api/history/unknown").await.json();
    assert_eq!(body["history"].as_array().unwrap().len(), 2);

    let body: Value = server.delete(&format!("/api/history/{one_id}")).await.json();
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
    assert_eq!(body["history"][0]["sentence"], "Two.");

    let body: Value = server.delete("/api/history").await.json();
    assert_eq!(body["history"], json!([]));
}

#[tokio::test]
async fn test_sample_and_theme() {
    let server = server_with(Arc::new(ScriptedAnalyzer::new())).await;

    let body: Value = server.post("/api/sample").await.json();
    assert_eq!(body["outcome"], "completed");
    let sentence = body["state"]["sentence"].as_str().unwrap();
    assert!(sentence_flow::controller::SAMPLE_SENTENCES.contains(&sentence));

    let body: Value = server.post("/api/theme/toggle").await.json();
    assert_eq!(body["theme"], "dark");
    let body: Value = server.post("/api/theme/toggle").await.json();
    assert_eq!(body["theme"], "light");
}

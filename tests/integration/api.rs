use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use deal_analyzer::analysis::DealAnalyzer;
use deal_analyzer::api::{build_router, ApiState};
use deal_analyzer::engine::{ComparableSettings, DealPipeline};
use deal_analyzer::llm::Commentator;
use deal_analyzer::types::Comparable;
use rust_decimal_macros::dec;

use crate::mock_listing::{MockListing, ScriptedCommentator};

fn app(listing: MockListing, with_commentator: bool) -> axum::Router {
    let commentator = with_commentator
        .then(|| Box::new(ScriptedCommentator::new()) as Box<dyn Commentator>);
    let pipeline = DealPipeline::new(
        Box::new(listing),
        commentator,
        DealAnalyzer::default(),
        ComparableSettings::default(),
    );
    build_router(Arc::new(ApiState::new(pipeline)))
}

async fn post(app: axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_analyze_endpoint_with_comparables() {
    let listing = MockListing::new()
        .with_comparables(vec![Comparable::priced(dec!(180000)), Comparable::priced(dec!(200000))]);
    let (status, json) = post(
        app(listing, true),
        "/api/analyze",
        serde_json::json!({"address": "9 Oak Ave, Tampa, FL"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "analysis");
    assert_eq!(json["property_data"]["city"], "Tampa");
    assert_eq!(json["deal_analysis"]["rating"], "EXCELLENT");
    assert_eq!(json["deal_analysis"]["arv"].as_f64(), Some(190000.0));
    assert_eq!(json["deal_analysis"]["roi_percentage"].as_f64(), Some(58.6));
    assert_eq!(json["repair_estimate"]["tier"], "medium");
    assert_eq!(json["comparables_used"], 2);
    assert_eq!(json["ai_analysis"], "9 Oak Ave rates EXCELLENT.");
}

#[tokio::test]
async fn test_analyze_endpoint_message() {
    let (status, json) = post(
        app(MockListing::new(), true),
        "/api/analyze",
        serde_json::json!({"message": "Thoughts on: 123 Main St, Austin, TX"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "analysis");
    assert_eq!(json["address"], "123 Main St, Austin, TX");
    assert_eq!(json["deal_analysis"]["recommendation"], "Pass — property is overpriced for investment.");
}

#[tokio::test]
async fn test_analyze_endpoint_unknown_property() {
    let (status, json) = post(
        app(MockListing::new(), false),
        "/api/analyze",
        serde_json::json!({"address": "404 Missing Way, Austin, TX"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["type"], "error");
}

#[tokio::test]
async fn test_chat_endpoint() {
    let (status, json) = post(
        app(MockListing::new(), true),
        "/api/chat",
        serde_json::json!({"message": "How much should I budget for holding costs?"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Focus on the 70% rule.");
}

#[tokio::test]
async fn test_chat_endpoint_empty_message() {
    let (status, json) = post(app(MockListing::new(), true), "/api/chat", serde_json::json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["type"], "error");
}

#[tokio::test]
async fn test_evaluate_endpoint_is_offline() {
    let (status, json) = post(
        app(MockListing::new(), false),
        "/api/evaluate",
        serde_json::json!({
            "property": {"address": "200 Any St", "list_price": 200000, "sqft": 1500, "year_built": 1990}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["analysis"]["max_allowable_offer"].as_f64(), Some(67250.0));
    assert_eq!(json["analysis"]["breakdown"]["selling_costs"].as_f64(), Some(18400.0));
    assert!(json["report"].as_str().unwrap().contains("$298,350.00"));
}

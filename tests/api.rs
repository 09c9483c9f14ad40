use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use quota_engine::api::{build_router, QuotaResponse};
use quota_engine::models::{CeilingKind, QuotaResult, RateTier};
use quota_engine::QuotaRules;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    build_router(QuotaRules::default())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable")
        .to_vec()
}

#[tokio::test]
async fn health_reports_ok() {
    let response = router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn calculate_returns_profile_and_result() {
    let response = router()
        .oneshot(post_json(
            "/api/quota",
            json!({"company_name": "Lotus Metalworks", "local_staff": 121, "tier": "B"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: QuotaResponse = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body.profile.company_name, "Lotus Metalworks");
    assert_eq!(body.profile.tier, RateTier::B);
    assert_eq!(body.result.base_case.ceiling, 25);
    assert_eq!(body.result.final_remaining, 49);
    assert_eq!(body.result.binding, CeilingKind::BlueCollarNetOfTransfer);
}

#[tokio::test]
async fn over_quota_keeps_negative_final_remaining() {
    let response = router()
        .oneshot(post_json(
            "/api/quota",
            json!({"company_name": "Overfull", "local_staff": 121, "tier": "0.20", "base_case": 200}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: QuotaResponse = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body.result.final_remaining, -71);
    assert_eq!(body.result.blue_collar_remaining, 0);
}

#[tokio::test]
async fn negative_headcount_is_unprocessable() {
    let response = router()
        .oneshot(post_json(
            "/api/quota",
            json!({"local_staff": 121, "tier": "B", "tech_staff": -3}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("tech_staff"));
}

#[tokio::test]
async fn unknown_tier_is_unprocessable() {
    let response = router()
        .oneshot(post_json("/api/quota", json!({"local_staff": 10, "tier": "Z"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn batch_keeps_submission_order() {
    let response = router()
        .oneshot(post_json(
            "/api/quota/batch",
            json!([
                {"local_staff": 121, "tier": "B"},
                {"local_staff": 121, "tier": "B", "base_case": 200},
                {"local_staff": 200, "tier": "C"}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let results: Vec<QuotaResult> = serde_json::from_slice(&read_body(response).await).unwrap();
    let finals: Vec<i64> = results.iter().map(|r| r.final_remaining).collect();
    assert_eq!(finals, vec![49, -71, 80]);
}

#[tokio::test]
async fn batch_names_the_invalid_entry() {
    let response = router()
        .oneshot(post_json(
            "/api/quota/batch",
            json!([
                {"local_staff": 121, "tier": "B"},
                {"local_staff": -1, "tier": "B"}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("[1].local_staff"));
}

#[tokio::test]
async fn report_renders_text_by_default() {
    let response = router()
        .oneshot(post_json(
            "/api/quota/report",
            json!({"company_name": "Harbor Castings", "local_staff": 121, "tier": "B"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-report-renderer"], "text");
    let text = String::from_utf8(read_body(response).await).unwrap();
    assert!(text.contains("Company: Harbor Castings"));
    assert!(text.contains("Additional hires permitted: 49"));
}

#[tokio::test]
async fn report_renders_json_on_request() {
    let response = router()
        .oneshot(post_json(
            "/api/quota/report?format=json",
            json!({"company_name": "Harbor Castings", "local_staff": 121, "tier": "B"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body: Value = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body["company_name"], "Harbor Castings");
    assert_eq!(body["final_remaining"], 49);
    assert_eq!(body["categories"].as_array().unwrap().len(), 5);
}

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use singlish_api::build_app;
use tower::ServiceExt;

#[tokio::test]
async fn health_is_public() {
    let app = build_app(None).await.expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["models"]["intent_engine"].is_string());
}

#[tokio::test]
async fn predict_requires_api_key() {
    let app = build_app(None).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "message": "kohomada" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn predict_returns_structured_payload() {
    let app = build_app(None).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::from(
            json!({ "message": "kohomada machan" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert!(parsed.get("response").is_some());
    assert_eq!(parsed["intent"], "how_are_you");
    let confidence = parsed["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    assert!(parsed["processing_time"].as_f64().is_some());
    assert_eq!(parsed["metadata"]["canonical_message"], "how are you friend");
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let app = build_app(None).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::from(json!({ "message": "   " }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn train_rejects_single_sample_labels() {
    let app = build_app(None).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/train")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::from(
            json!({
                "samples": [
                    { "text": "lonely sample", "intent": "orphan" }
                ]
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["error"], "training_failed");
}

#[tokio::test]
async fn train_then_predict_uses_the_new_model() {
    let app = build_app(None).await.expect("app should build");

    let train_request = Request::builder()
        .method("POST")
        .uri("/v1/train")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::from(
            json!({
                "samples": [
                    { "text": "hello there", "intent": "greeting" },
                    { "text": "good morning", "intent": "greeting" },
                    { "text": "hi friend", "intent": "greeting" },
                    { "text": "bye for now", "intent": "goodbye" },
                    { "text": "time to go", "intent": "goodbye" },
                    { "text": "leaving now goodbye", "intent": "goodbye" }
                ]
            })
            .to_string(),
        ))
        .unwrap();

    let train_response = app.clone().oneshot(train_request).await.unwrap();
    assert_eq!(train_response.status(), StatusCode::OK);

    let body = to_bytes(train_response.into_body(), usize::MAX).await.unwrap();
    let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["intent_count"], 2);
    assert_eq!(report["sample_count"], 6);
    assert!(report["accuracy"].as_f64().is_some());

    let predict_request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::from(json!({ "message": "hello there" }).to_string()))
        .unwrap();

    let predict_response = app.oneshot(predict_request).await.unwrap();
    assert_eq!(predict_response.status(), StatusCode::OK);

    let body = to_bytes(predict_response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["intent"], "greeting");
}

#[tokio::test]
async fn models_status_is_authenticated() {
    let app = build_app(None).await.expect("app should build");

    let unauthenticated = Request::builder()
        .uri("/v1/models/status")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(unauthenticated).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let authenticated = Request::builder()
        .uri("/v1/models/status")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(authenticated).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["strategy"], "statistical");
    assert!(parsed["labels"].as_array().is_some_and(|labels| !labels.is_empty()));
}

#[tokio::test]
async fn analytics_reflects_recorded_predictions() {
    let app = build_app(None).await.expect("app should build");

    let predict_request = Request::builder()
        .method("POST")
        .uri("/v1/predict")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::from(json!({ "message": "stuti machan" }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(predict_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let analytics_request = Request::builder()
        .uri("/v1/analytics")
        .header("x-api-key", "dev-singlish-key")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(analytics_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["total_interactions"], 1);
    assert!(parsed["intent_distribution"].as_array().is_some());
}

#[tokio::test]
async fn rate_limit_kicks_in_per_ip() {
    let app = build_app(None).await.expect("app should build");

    // exhaust the default per-IP budget of 80 requests per window
    for _ in 0..80 {
        let request = Request::builder()
            .uri("/v1/models/status")
            .header("x-api-key", "dev-singlish-key")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let over_budget = Request::builder()
        .uri("/v1/models/status")
        .header("x-api-key", "dev-singlish-key")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(over_budget).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // a different caller is unaffected
    let other_ip = Request::builder()
        .uri("/v1/models/status")
        .header("x-api-key", "dev-singlish-key")
        .header("x-forwarded-for", "203.0.113.10")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(other_ip).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

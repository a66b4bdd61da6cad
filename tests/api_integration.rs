//! Integration tests for the HTTP API.
//!
//! Most tests drive the axum router directly through `tower::Service` with a
//! scripted provider; the last ones go over real HTTP to wiremock providers.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    app_with, completion_json, fast_config, model_a, model_b, registry_with, ScriptedCaller,
};
use orchestrator::api::{FALLBACK_FROM_HEADER, MODEL_HEADER};
use orchestrator::provider::{HttpProviderCaller, ProviderCaller};
use orchestrator::routing::BreakerState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_app(caller: ScriptedCaller) -> (axum::Router, Arc<orchestrator::api::AppState>) {
    let registry = registry_with(vec![model_a(), model_b()], "http://unused");
    app_with(fast_config(), registry, Arc::new(caller))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn chat_body(profile: Option<&str>) -> Value {
    let mut body = json!({
        "model": "auto",
        "messages": [{"role": "user", "content": "Hello there"}]
    });
    if let Some(p) = profile {
        body["routing_profile"] = json!(p);
    }
    body
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_completion_routes_to_primary() {
    let (mut app, _) = test_app(ScriptedCaller::new());

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(Some("quality"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[MODEL_HEADER], "A");
    assert!(response.headers().get(FALLBACK_FROM_HEADER).is_none());
    let json = body_json(response).await;
    assert_eq!(json["model"], "A");
}

#[tokio::test]
async fn test_chat_completion_budget_profile_picks_cheap_model() {
    let (mut app, _) = test_app(ScriptedCaller::new());
    let response = app
        .call(post_json("/v1/chat/completions", chat_body(Some("budget"))))
        .await
        .unwrap();
    assert_eq!(response.headers()[MODEL_HEADER], "B");
}

#[tokio::test]
async fn test_chat_completion_fallback_sets_headers() {
    let (mut app, state) = test_app(ScriptedCaller::new().failing("A", u32::MAX));

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(Some("quality"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[MODEL_HEADER], "B");
    assert_eq!(response.headers()[FALLBACK_FROM_HEADER], "A");
    assert_eq!(
        state
            .router
            .breakers()
            .snapshot("A")
            .unwrap()
            .consecutive_failures,
        1
    );
}

#[tokio::test]
async fn test_unknown_profile_is_400_without_breaker_changes() {
    let (mut app, state) = test_app(ScriptedCaller::new());

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(Some("nonexistent"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "unknown_profile");
    assert!(state.router.breakers().snapshots().is_empty());
}

#[tokio::test]
async fn test_all_models_exhausted_is_502_with_attempts() {
    let (mut app, _) = test_app(
        ScriptedCaller::new()
            .failing("A", u32::MAX)
            .failing("B", u32::MAX),
    );

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "bad_gateway");
    assert_eq!(json["attempts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_no_models_is_503() {
    let registry = registry_with(vec![], "http://unused");
    let (mut app, _) = app_with(fast_config(), registry, Arc::new(ScriptedCaller::new()));

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pinned_model() {
    let (mut app, _) = test_app(ScriptedCaller::new());

    let mut body = chat_body(Some("quality"));
    body["model"] = json!("B");
    let response = app
        .call(post_json("/v1/chat/completions", body))
        .await
        .unwrap();
    assert_eq!(response.headers()[MODEL_HEADER], "B");

    let mut body = chat_body(None);
    body["model"] = json!("gpt-7");
    let response = app
        .call(post_json("/v1/chat/completions", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "model_not_found");
}

#[tokio::test]
async fn test_streaming_and_empty_messages_rejected() {
    let (mut app, _) = test_app(ScriptedCaller::new());

    let mut body = chat_body(None);
    body["stream"] = json!(true);
    let response = app
        .call(post_json("/v1/chat/completions", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .call(post_json(
            "/v1/chat/completions",
            json!({"model": "auto", "messages": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_preview_makes_no_calls() {
    let caller = Arc::new(ScriptedCaller::new());
    let registry = registry_with(vec![model_a(), model_b()], "http://unused");
    let (mut app, _) = app_with(fast_config(), registry, caller.clone());

    let response = app
        .call(post_json(
            "/v1/route",
            json!({"prompt": "Hello", "routing_profile": "budget"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["profile"], "budget");
    assert_eq!(json["chain"][0]["model_id"], "B");
    assert_eq!(json["complexity"]["tier"], "simple");
    assert!(caller.calls().is_empty());

    let response = app
        .call(post_json(
            "/v1/route",
            json!({"prompt": "Hello", "routing_profile": "budget", "exclude": ["B"]}),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["chain"].as_array().unwrap().len(), 1);
    assert_eq!(json["chain"][0]["model_id"], "A");
}

#[tokio::test]
async fn test_profiles_endpoint() {
    let (mut app, _) = test_app(ScriptedCaller::new());
    let response = app.call(get("/v1/routing/profiles")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["default_profile"], "balanced");
    let profiles = json["profiles"].as_array().unwrap();
    assert_eq!(profiles.len(), 5);
    let speed = profiles.iter().find(|p| p["name"] == "speed").unwrap();
    assert_eq!(speed["max_latency_ms"], 1000.0);
}

#[tokio::test]
async fn test_models_list_and_update() {
    let (mut app, state) = test_app(ScriptedCaller::new());
    for _ in 0..3 {
        state.router.breakers().record_failure("A");
    }

    let response = app.call(get("/v1/models")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["object"], "list");
    assert_eq!(json["data"][0]["id"], "A");
    assert_eq!(json["data"][0]["breaker_state"], "OPEN");
    assert_eq!(json["data"][1]["breaker_state"], "CLOSED");

    let response = app
        .call(
            Request::builder()
                .method("PATCH")
                .uri("/v1/models/B")
                .header("content-type", "application/json")
                .body(Body::from(json!({"quality": 0.95}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.registry.get_model("B").unwrap().candidate.quality, 0.95);

    let response = app
        .call(
            Request::builder()
                .method("PATCH")
                .uri("/v1/models/B")
                .header("content-type", "application/json")
                .body(Body::from(json!({"quality": 1.5}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .call(
            Request::builder()
                .method("PATCH")
                .uri("/v1/models/missing")
                .header("content-type", "application/json")
                .body(Body::from(json!({"available": false}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_breaker_endpoints() {
    let (mut app, state) = test_app(ScriptedCaller::new());
    for _ in 0..3 {
        state.router.breakers().record_failure("A");
    }

    let response = app.call(get("/v1/routing/breakers")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["failure_threshold"], 3);
    assert_eq!(json["breakers"][0]["model_id"], "A");
    assert_eq!(json["breakers"][0]["state"], "OPEN");

    let response = app
        .call(post_json("/v1/routing/breakers/A/reset", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        state.router.breakers().state("A"),
        Some(BreakerState::Closed)
    );

    let response = app
        .call(post_json("/v1/routing/breakers/nope/reset", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for _ in 0..3 {
        state.router.breakers().record_failure("B");
    }
    let response = app
        .call(post_json("/v1/routing/breakers/reset", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.router.breakers().open_count(), 0);
}

#[tokio::test]
async fn test_health_reflects_open_breakers() {
    let (mut app, state) = test_app(ScriptedCaller::new());

    let json = body_json(app.call(get("/health")).await.unwrap()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["models"]["total"], 2);

    for _ in 0..3 {
        state.router.breakers().record_failure("A");
    }
    let json = body_json(app.call(get("/health")).await.unwrap()).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["models"]["routable"], 1);
    assert_eq!(json["models"]["circuit_open"], 1);

    let registry = registry_with(vec![], "http://unused");
    let (mut empty, _) = app_with(fast_config(), registry, Arc::new(ScriptedCaller::new()));
    let json = body_json(empty.call(get("/health")).await.unwrap()).await;
    assert_eq!(json["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (mut app, _) = test_app(ScriptedCaller::new());
    let response = app.call(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (mut app, _) = test_app(ScriptedCaller::new());
    let response = app.call(get("/v1/nothing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_to_end_over_http_with_fallback() {
    let failing = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&failing)
        .await;

    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "B"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("B")))
        .expect(1)
        .mount(&healthy)
        .await;

    let registry = registry_with(vec![model_a()], &failing.uri());
    registry
        .add_model(orchestrator::registry::RegisteredModel::new(
            model_b(),
            orchestrator::registry::ProviderEndpoint::new(healthy.uri()),
        ))
        .unwrap();
    let caller: Arc<dyn ProviderCaller> = Arc::new(HttpProviderCaller::new(
        reqwest::Client::new(),
        Arc::clone(&registry),
    ));
    let (mut app, _) = app_with(fast_config(), registry, caller);

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(Some("quality"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[MODEL_HEADER], "B");
    assert_eq!(response.headers()[FALLBACK_FROM_HEADER], "A");
    let json = body_json(response).await;
    assert_eq!(json["choices"][0]["message"]["content"], "answer from B");
}

#[tokio::test]
async fn test_routing_profile_not_forwarded_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("A")))
        .mount(&server)
        .await;

    let registry = registry_with(vec![model_a()], &server.uri());
    let caller: Arc<dyn ProviderCaller> = Arc::new(HttpProviderCaller::new(
        reqwest::Client::new(),
        Arc::clone(&registry),
    ));
    let (mut app, _) = app_with(fast_config(), registry, caller);

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(Some("quality"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let received = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body.get("routing_profile").is_none());
    assert_eq!(body["stream"], false);
}

#[tokio::test]
async fn test_delete_model_drops_its_breaker() {
    let (mut app, state) = test_app(ScriptedCaller::new());
    for _ in 0..3 {
        state.router.breakers().record_failure("A");
    }

    let delete = |uri: &str| {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    let response = app.call(delete("/v1/models/A")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], "A");
    assert_eq!(json["breaker_state"], "OPEN");

    assert!(!state.registry.contains("A"));
    assert!(state.router.breakers().snapshot("A").is_none());

    let response = app
        .call(post_json("/v1/chat/completions", chat_body(Some("quality"))))
        .await
        .unwrap();
    assert_eq!(response.headers()[MODEL_HEADER], "B");

    let response = app.call(delete("/v1/models/A")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Integration tests for the HTTP webhook server

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use callbox::{
    config::CallboxConfig,
    server::{compute_signature, create_router, CallboxServer, SIGNATURE_HEADER},
};
use mockito::{Server, ServerGuard};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::ServiceExt;

const PUBLIC_URL: &str = "https://callbox.example";
const AUTH_TOKEN: &str = "test-token";

fn base_config(access: &ServerGuard) -> CallboxConfig {
    CallboxConfig::new(access.url(), "test-key", "+15550009999")
}

fn signed_config(access: &ServerGuard) -> CallboxConfig {
    let mut config = base_config(access);
    config.public_url = Some(PUBLIC_URL.to_string());
    config.provider.account_sid = Some("AC123".to_string());
    config.provider.auth_token = Some(AUTH_TOKEN.to_string());
    config
}

fn app(config: CallboxConfig) -> axum::Router {
    let server = CallboxServer::from_config(config).expect("Failed to create server");
    create_router(Arc::new(server))
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn form_body(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.replace('+', "%2B")))
        .collect::<Vec<_>>()
        .join("&")
}

fn webhook_request(params: &BTreeMap<String, String>, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/callbox")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(form_body(params))).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn mock_trigger(access: &mut ServerGuard) -> mockito::Mock {
    access
        .mock("POST", "/callbox_trigger")
        .with_status(200)
        .with_body(
            json!({
                "forwardingTargets": {
                    "+15550001111": { "name": "Front desk", "phoneNumber": "+15550002222" }
                },
                "digits": 4,
                "numCodes": 1,
                "numSingleUseCodes": 0
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn test_health_check() {
    let access = Server::new_async().await;
    let response = app(base_config(&access))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_webhook_returns_voice_markup() {
    let mut access = Server::new_async().await;
    let _trigger = mock_trigger(&mut access).await;

    let params = params(&[("From", "+15550003333"), ("To", "+15550001111"), ("CallSid", "CA42")]);
    let response = app(base_config(&access))
        .oneshot(webhook_request(&params, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml"
    );
    let xml = body_text(response).await;
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#));
    assert!(xml.contains(r#"<Gather numDigits="4" timeout="10">"#));
    assert!(xml.contains("<Dial>+15550002222</Dial>"));
}

#[tokio::test]
async fn test_signed_webhook_is_accepted() {
    let mut access = Server::new_async().await;
    let _trigger = mock_trigger(&mut access).await;

    let params = params(&[
        ("AccountSid", "AC123"),
        ("CallSid", "CA42"),
        ("From", "+15550003333"),
        ("To", "+15550001111"),
    ]);
    let signature = compute_signature(AUTH_TOKEN, &format!("{PUBLIC_URL}/callbox"), &params);

    let response = app(signed_config(&access))
        .oneshot(webhook_request(&params, Some(&signature)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unsigned_or_tampered_webhook_is_rejected() {
    let access = Server::new_async().await;
    let config = signed_config(&access);

    let mut params = params(&[
        ("AccountSid", "AC123"),
        ("From", "+15550003333"),
        ("To", "+15550001111"),
    ]);

    let response = app(config.clone())
        .oneshot(webhook_request(&params, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let signature = compute_signature(AUTH_TOKEN, &format!("{PUBLIC_URL}/callbox"), &params);
    params.insert("Digits".to_string(), "0000".to_string());
    let response = app(config)
        .oneshot(webhook_request(&params, Some(&signature)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_foreign_account_is_rejected() {
    let access = Server::new_async().await;
    let mut config = base_config(&access);
    config.provider.account_sid = Some("AC123".to_string());

    let params = params(&[
        ("AccountSid", "AC999"),
        ("From", "+15550003333"),
        ("To", "+15550001111"),
    ]);
    let response = app(config)
        .oneshot(webhook_request(&params, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

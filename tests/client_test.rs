//! 同定APIクライアントのテスト
//!
//! スタブサーバーに対してHTTPレベルの結果の写像を検証

mod support;

use plant_id_common::{HealthMode, IdentificationOptions, RequestShape};
use plant_id_rust::config::Config;
use plant_id_rust::{EncodedImage, IdentificationClient, RequestCause, RequestError};
use serde_json::json;
use std::time::Duration;
use support::{closed_url, StubResponse, StubServer};

fn client_for(url: String, timeout_seconds: u64) -> IdentificationClient {
    let config = Config {
        identification_url: url,
        timeout_seconds,
        ..Default::default()
    };
    IdentificationClient::new(&config, "test-key".to_string()).expect("client init failed")
}

fn sample_image() -> EncodedImage {
    EncodedImage::from_jpeg_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9]).unwrap()
}

fn suggestion_body() -> serde_json::Value {
    json!({
        "access_token": "abc",
        "model_version": "plant_id:3.6",
        "result": { "classification": { "suggestions": [
            { "name": "Ficus benjamina", "probability": 0.8734 }
        ]}},
        "status": "COMPLETED"
    })
}

/// 成功時はJSONオブジェクトを返し、ヘッダーと本文を正しく送る
#[tokio::test]
async fn test_identify_success_sends_expected_request() {
    let server = StubServer::start(StubResponse::json(201, suggestion_body())).await;
    let client = client_for(server.url("/api/v3/identification"), 5);
    let image = sample_image();
    let options = IdentificationOptions::default().with_location(Some(50.1), Some(14.4));

    let raw = client.identify(&image, &options).await.expect("identify failed");
    assert!(raw.contains_key("result"));

    let request = server.request().await;
    assert_eq!(request.method, "POST");
    assert!(request.target.starts_with("/api/v3/identification?"));
    assert!(request.target.contains("details=common_names%2Cdescription"));
    assert_eq!(request.header("Api-Key"), Some("test-key"));
    assert_eq!(request.header("Content-Type"), Some("application/json"));
    assert!(request.header("User-Agent").unwrap_or_default().starts_with("plant-id-rust/"));

    let body = request.json();
    assert_eq!(body["images"], json!([image.base64()]));
    assert_eq!(body["similar_images"], true);
    assert_eq!(body["latitude"], 50.1);
    assert_eq!(body["longitude"], 14.4);
    assert!(body.get("health").is_none());
}

/// health 形式では健康フラグのみを送る
#[tokio::test]
async fn test_identify_health_shape_body() {
    let server = StubServer::start(StubResponse::json(200, suggestion_body())).await;
    let client = client_for(server.url("/api/v3/identification"), 5);
    let options = IdentificationOptions {
        shape: RequestShape::Health,
        health: HealthMode::Auto,
        ..Default::default()
    }
    .with_location(Some(1.0), Some(2.0));

    client.identify(&sample_image(), &options).await.expect("identify failed");

    let body = server.request().await.json();
    assert_eq!(body["health"], "auto");
    assert!(body.get("latitude").is_none());
    assert!(body.get("longitude").is_none());
}

/// 401 は InvalidResponse ではなく HttpResponse
#[tokio::test]
async fn test_unauthorized_is_http_response_error() {
    let server = StubServer::start(StubResponse::new(401, r#"{"error":"bad key"}"#)).await;
    let client = client_for(server.url("/api/v3/identification"), 5);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();

    match err {
        RequestError::HttpResponse { status, reason, body } => {
            assert_eq!(status, 401);
            assert_eq!(reason, "Unauthorized");
            assert_eq!(body, r#"{"error":"bad key"}"#);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_request_is_http_response_error() {
    let server = StubServer::start(StubResponse::new(400, r#"{"error":"image missing"}"#)).await;
    let client = client_for(server.url("/api/v3/identification"), 5);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::HttpResponse { status: 400, .. }));
}

/// 200 でも本文がJSONでなければ InvalidResponse
#[tokio::test]
async fn test_non_json_success_is_invalid_response() {
    let server = StubServer::start(StubResponse::new(200, "<html>maintenance</html>")).await;
    let client = client_for(server.url("/api/v3/identification"), 5);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_server_error_is_invalid_response() {
    let server = StubServer::start(StubResponse::json(500, json!({ "error": "boom" }))).await;
    let client = client_for(server.url("/api/v3/identification"), 5);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidResponse(_)));
}

/// 応答が遅ければタイムアウト
#[tokio::test]
async fn test_timeout_is_request_failed() {
    let server = StubServer::start(
        StubResponse::json(200, suggestion_body()).delayed(Duration::from_secs(4)),
    )
    .await;
    let client = client_for(server.url("/api/v3/identification"), 1);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::RequestFailed(RequestCause::Timeout)));
}

/// 接続できなければ通信エラー
#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let client = client_for(format!("{}/api/v3/identification", closed_url().await), 5);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::RequestFailed(RequestCause::Transport(_))));
}

#[tokio::test]
async fn test_malformed_endpoint_is_invalid_url() {
    let client = client_for("plant.id without scheme".to_string(), 5);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidUrl(_)));
}

/// http以外のスキームは送信前に InvalidUrl
#[tokio::test]
async fn test_non_http_endpoint_is_invalid_url() {
    let client = client_for("ftp://plant.id/api/v3/identification".to_string(), 5);

    let err = client
        .identify(&sample_image(), &IdentificationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidUrl(_)));
}

// SPDX-License-Identifier: MIT

//! Apple identity-token verification tests against a mocked key-set
//! endpoint, using a locally generated RSA keypair.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

const TEST_AUDIENCE: &str = "com.example.test-app";

struct TestKey {
    encoding_key: EncodingKey,
    jwk: serde_json::Value,
}

/// Generate an RSA keypair and its public JWK under the given kid.
fn generate_key(kid: &str) -> TestKey {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate RSA key");
    let public_key = RsaPublicKey::from(&private_key);

    let der = private_key.to_pkcs1_der().expect("Failed to encode key");
    let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

    let jwk = json!({
        "kid": kid,
        "kty": "RSA",
        "alg": "RS256",
        "use": "sig",
        "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
    });

    TestKey { encoding_key, jwk }
}

fn sign_id_token(key: &TestKey, kid: &str, claims: serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(&header, &claims, &key.encoding_key).expect("Failed to sign id token")
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn standard_claims(exp: u64) -> serde_json::Value {
    json!({
        "iss": "https://appleid.apple.com",
        "aud": TEST_AUDIENCE,
        "sub": "apple-sub-1",
        "email": "s@ex.com",
        "iat": now_secs(),
        "exp": exp,
    })
}

async fn mount_keys(server: &MockServer, jwk: &serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/auth/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"keys": [jwk]})))
        .mount(server)
        .await;
}

fn apple_login_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/social/apple")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn apple_login_creates_user_with_caller_name() {
    let key = generate_key("test-kid");
    let server = MockServer::start().await;
    mount_keys(&server, &key.jwk).await;

    let token = sign_id_token(&key, "test-kid", standard_claims(now_secs() + 600));
    let (app, state) = common::create_test_app(common::mock_provider_config(&server.uri()));

    let response = app
        .oneshot(apple_login_request(json!({"id_token": token, "name": "Sun"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["created"], true);
    assert_eq!(body["message"], "Apple login successful");
    assert_eq!(body["user"]["username"], "s");
    assert_eq!(body["user"]["email"], "s@ex.com");
    assert_eq!(body["user"]["name"], "Sun");

    let accounts = body["user"]["social_accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["provider"], "apple");
    assert_eq!(accounts[0]["uid"], "apple-sub-1");

    assert_eq!(state.db.user_count().await.unwrap(), 1);
}

#[tokio::test]
async fn expired_token_is_rejected_despite_valid_signature() {
    let key = generate_key("test-kid");
    let server = MockServer::start().await;
    mount_keys(&server, &key.jwk).await;

    // Signature and audience are fine; only the expiry is in the past.
    let token = sign_id_token(&key, "test-kid", standard_claims(now_secs() - 3600));
    let (app, state) = common::create_test_app(common::mock_provider_config(&server.uri()));

    let response = app
        .oneshot(apple_login_request(json!({"id_token": token})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid or expired provider token");
    assert_eq!(state.db.user_count().await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_key_id_is_rejected() {
    let key = generate_key("published-kid");
    let server = MockServer::start().await;
    mount_keys(&server, &key.jwk).await;

    // Header kid does not appear in the fetched key set
    let token = sign_id_token(&key, "rogue-kid", standard_claims(now_secs() + 600));
    let (app, state) = common::create_test_app(common::mock_provider_config(&server.uri()));

    let response = app
        .oneshot(apple_login_request(json!({"id_token": token})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid or expired provider token");
    assert_eq!(state.db.user_count().await.unwrap(), 0);
}

#[tokio::test]
async fn wrong_audience_is_rejected() {
    let key = generate_key("test-kid");
    let server = MockServer::start().await;
    mount_keys(&server, &key.jwk).await;

    let mut claims = standard_claims(now_secs() + 600);
    claims["aud"] = json!("com.example.other-app");
    let token = sign_id_token(&key, "test-kid", claims);
    let (app, _state) = common::create_test_app(common::mock_provider_config(&server.uri()));

    let response = app
        .oneshot(apple_login_request(json!({"id_token": token})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn caller_name_is_only_used_at_creation() {
    let key = generate_key("test-kid");
    let server = MockServer::start().await;
    mount_keys(&server, &key.jwk).await;

    let token = sign_id_token(&key, "test-kid", standard_claims(now_secs() + 600));
    let (app, _state) = common::create_test_app(common::mock_provider_config(&server.uri()));

    let first = app
        .clone()
        .oneshot(apple_login_request(json!({"id_token": token, "name": "Sun"})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let token = sign_id_token(&key, "test-kid", standard_claims(now_secs() + 600));
    let second = app
        .oneshot(apple_login_request(json!({"id_token": token, "name": "Imposter"})))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);

    let body = response_json(second).await;
    assert_eq!(body["created"], false);
    assert_eq!(body["user"]["name"], "Sun");
}

#[tokio::test]
async fn missing_id_token_is_bad_request() {
    let server = MockServer::start().await;
    let (app, _state) = common::create_test_app(common::mock_provider_config(&server.uri()));

    let response = app
        .oneshot(apple_login_request(json!({"name": "Sun"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "id_token is required");
}

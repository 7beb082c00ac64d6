//! Fixtures shared by handler and client tests.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::{AuthError, AuthUser, AuthVerifier};
use crate::config::{Config, StoreBackend};
use crate::llm_client::LlmClient;
use crate::state::AppState;
use crate::store::ResumeRepository;

pub const TEST_TOKEN: &str = "test-token";
pub const TEST_USER: Uuid = Uuid::from_u128(0x5f0c_2b1e_8d4a_4c1b_9e2f_0a1b_2c3d_4e5f);

pub const OTHER_TOKEN: &str = "other-token";
pub const OTHER_USER: Uuid = Uuid::from_u128(0x7a3e_91c4_0b2d_4f6e_8a1c_3d5e_7f90_1b2c);

/// Nothing listens here, so any call that reaches it fails fast.
const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Accepts exactly two fixed tokens.
pub struct StaticTokenVerifier;

#[async_trait]
impl AuthVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        match token {
            TEST_TOKEN => Ok(AuthUser {
                id: TEST_USER,
                email: Some("test@example.com".to_string()),
            }),
            OTHER_TOKEN => Ok(AuthUser {
                id: OTHER_USER,
                email: None,
            }),
            _ => Err(AuthError::Rejected),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        store_backend: StoreBackend::Memory,
        database_url: None,
        supabase_url: UNREACHABLE.to_string(),
        supabase_anon_key: "anon".to_string(),
        groq_api_key: "test".to_string(),
        groq_model: "test-model".to_string(),
        groq_api_url: format!("{UNREACHABLE}/chat/completions"),
        s3_bucket: "resume-assets".to_string(),
        s3_endpoint: UNREACHABLE.to_string(),
        s3_public_url: "https://cdn.example.com/resume-assets".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub fn test_state<R: ResumeRepository + 'static>(repo: Arc<R>) -> AppState {
    let config = test_config();
    let llm = LlmClient::new(&config.groq_api_url, "test", "test-model").unwrap();
    test_state_with_llm(repo, llm)
}

pub fn test_state_with_llm<R: ResumeRepository + 'static>(repo: Arc<R>, llm: LlmClient) -> AppState {
    let config = test_config();
    let s3_config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .endpoint_url(&config.s3_endpoint)
        .force_path_style(true)
        .build();

    AppState {
        resumes: repo,
        auth: Arc::new(StaticTokenVerifier),
        s3: aws_sdk_s3::Client::from_conf(s3_config),
        llm,
        config,
    }
}

/// An [`LlmClient`] whose every completion is `reply`, served from a local listener.
pub async fn fake_llm(reply: &str) -> LlmClient {
    let body = json!({ "choices": [{ "message": { "role": "assistant", "content": reply } }] });
    let app = Router::new().route(
        "/chat/completions",
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    LlmClient::new(format!("http://{addr}/chat/completions"), "test", "test-model").unwrap()
}

/// Sends one request through `app` and returns status, headers and raw body.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, HeaderMap, Bytes) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes)
}

/// Like [`send_raw`], decoding the body as JSON (`Null` when it is not JSON).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, token, body).await;
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

const BOUNDARY: &str = "resume-test-boundary";

/// One part: name, optional (filename, content type), payload.
pub type Part<'a> = (&'a str, Option<(&'a str, &'a str)>, &'a [u8]);

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file, payload) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(payload);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

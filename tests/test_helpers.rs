// tests/test_helpers.rs
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use futures::StreamExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

use iris::correlation::{CorrelationEngine, CorrelationStore, EngineOptions};
use iris::llm::{Completion, CompletionRequest, Dispatcher, Provider};
use iris::storage::LocalImageStore;
use iris::voice::CredentialIssuer;
use iris::web::{self, state::AppState};
use iris::{IrisError, Result};

pub const BASE_URL: &str = "http://iris.test";
pub const BOUNDARY: &str = "iris-test-boundary";

/// PNG signature plus the start of an IHDR chunk
pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// How the fake backend answers
#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Stream(Vec<&'static str>),
    Fail(String),
}

/// Dispatcher that records every request it receives
pub struct RecordingDispatcher {
    pub requests: Mutex<Vec<CompletionRequest>>,
    reply: Reply,
}

impl RecordingDispatcher {
    pub fn new(reply: Reply) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply,
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(Reply::Json(json!({
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
        })))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Reply::Json(value) => Ok(Completion::Json(value.clone())),
            Reply::Stream(chunks) => {
                let chunks: Vec<Result<Bytes>> =
                    chunks.iter().copied().map(|c| Ok(Bytes::from(c))).collect();
                Ok(Completion::Stream(futures::stream::iter(chunks).boxed()))
            }
            Reply::Fail(msg) => Err(IrisError::Upstream(msg.clone())),
        }
    }

    fn provider_type(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> String {
        "fake-model".to_string()
    }
}

/// Credential issuer with a fixed answer
pub struct StaticCredentials(pub std::result::Result<Option<String>, String>);

#[async_trait]
impl CredentialIssuer for StaticCredentials {
    async fn connection_credential(&self) -> Result<Option<String>> {
        self.0.clone().map_err(IrisError::Upstream)
    }
}

pub struct TestApp {
    pub router: axum::Router,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub engine: Arc<CorrelationEngine>,
    _dir: tempfile::TempDir,
}

pub struct TestAppBuilder {
    options: EngineOptions,
    dispatcher: RecordingDispatcher,
    credentials: StaticCredentials,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            options: EngineOptions::default(),
            dispatcher: RecordingDispatcher::answering("I see a picture."),
            credentials: StaticCredentials(Ok(None)),
        }
    }

    pub fn options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dispatcher(mut self, dispatcher: RecordingDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn credentials(mut self, credentials: StaticCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub async fn build(self) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let images = Arc::new(LocalImageStore::open(dir.path(), BASE_URL).await.unwrap());
        let engine = Arc::new(CorrelationEngine::new(
            Arc::new(CorrelationStore::new()),
            images.clone(),
            self.options,
        ));
        let dispatcher = Arc::new(self.dispatcher);
        let state = AppState::new(
            engine.clone(),
            dispatcher.clone(),
            Arc::new(self.credentials),
            images,
        );

        TestApp {
            router: web::create_router(state),
            dispatcher,
            engine,
            _dir: dir,
        }
    }
}

pub async fn create_test_app() -> TestApp {
    TestAppBuilder::new().build().await
}

// ============================================================================
// Request builders
// ============================================================================

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One multipart part: (field name, optional file name, bytes)
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(file) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, file
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn post_multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn upload_request(token: &str, image: &[u8]) -> Request<Body> {
    post_multipart(
        "/api/upload",
        &[("session_token", None, token.as_bytes()), ("image", Some("photo.png"), image)],
    )
}

// ============================================================================
// Response helpers
// ============================================================================

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use combolink_worker::config::WorkerConfig;
use combolink_worker::HttpServer;
use std::io::Write;

pub const BOUNDARY: &str = "----combolink-test-boundary";

/// A worker whose release API points at `api_base`.
pub fn worker(api_base: &str) -> axum::Router {
    let mut config = WorkerConfig::default();
    config.github.api_base = api_base.to_string();
    config.github.timeout_secs = 2;
    HttpServer::new(config, Some("test-token".to_string()))
        .expect("worker should build")
        .router()
}

/// base64(brotli(json)).
pub fn encode_debug_code(json: &str) -> String {
    let mut compressed = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
        writer.write_all(json.as_bytes()).unwrap();
    }
    STANDARD.encode(compressed)
}

/// One multipart form part.
pub enum Part<'a> {
    Text { name: &'a str, value: &'a str },
    File { name: &'a str, filename: &'a str, content: &'a [u8] },
}

/// Build a `multipart/form-data` POST request.
pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        write!(body, "--{BOUNDARY}\r\n").unwrap();
        match part {
            Part::Text { name, value } => {
                write!(body, "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").unwrap();
            }
            Part::File { name, filename, content } => {
                write!(
                    body,
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: text/plain\r\n\r\n"
                )
                .unwrap();
                body.extend_from_slice(content);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    write!(body, "--{BOUNDARY}--\r\n").unwrap();

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

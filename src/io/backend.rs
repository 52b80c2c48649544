// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! REST client for the image/annotation backend.
//!
//! The backend owns image storage and the persisted box lists. This module
//! only speaks its HTTP interface:
//!
//! | call     | request                                   | success           |
//! |----------|-------------------------------------------|-------------------|
//! | list     | `GET {api}/images`                        | `ImageRecord[]`   |
//! | upload   | `POST {api}/images/upload` (multipart)    | `ImageRecord[]`   |
//! | save     | `PUT {api}/images/{id}/boxes`             | `ImageRecord`     |
//! | delete   | `DELETE {api}/images/{id}`                |                   |
//! | pixels   | `GET {server}{path}`                      | raw image bytes   |

use crate::config::AppConfig;
use crate::io::upload::UploadFile;
use crate::models::{annotation::BoundingBox, image::ImageRecord};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the session token issued by the auth collaborator.
pub const AUTH_HEADER: &str = "x-auth-token";

/// Failures talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Network(_) => true,
            BackendError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Operations the application needs from the backend.
pub trait ImageBackend: Send + Sync {
    fn list_images(&self) -> BackendResult<Vec<ImageRecord>>;
    fn upload_images(&self, files: &[UploadFile]) -> BackendResult<Vec<ImageRecord>>;
    fn save_boxes(&self, image_id: &str, boxes: &[BoundingBox]) -> BackendResult<ImageRecord>;
    fn delete_image(&self, image_id: &str) -> BackendResult<()>;
    fn fetch_image_bytes(&self, path: &str) -> BackendResult<Vec<u8>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveBoxesBody<'a> {
    bounding_boxes: &'a [BoundingBox],
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Blocking HTTP implementation of [`ImageBackend`].
pub struct HttpBackend {
    server_url: String,
    api_url: String,
    auth_token: Option<String>,
    client: Client,
}

impl HttpBackend {
    /// Build a client from the application configuration.
    pub fn new(config: &AppConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let server_url = config.server_url.trim_end_matches('/').to_string();
        let prefix = config.api_prefix.trim_matches('/');
        let api_url = if prefix.is_empty() {
            server_url.clone()
        } else {
            format!("{}/{}", server_url, prefix)
        };

        Ok(Self {
            server_url,
            api_url,
            auth_token: config.auth_token.clone(),
            client,
        })
    }

    /// URL of an image's pixel data given its server-relative path.
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.server_url, path.trim_start_matches('/'))
        }
    }

    fn api(&self, route: &str) -> String {
        format!("{}/{}", self.api_url, route.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.header(AUTH_HEADER, token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder, what: &str) -> BackendResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .map_err(|e| BackendError::Network(format!("{}: {}", what, e)))?;
        check_status(response, what)
    }
}

/// Map non-2xx responses onto [`BackendError`].
fn check_status(response: Response, what: &str) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(status_error(status, what, &body))
}

fn status_error(status: StatusCode, what: &str, body: &str) -> BackendError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = if message.is_empty() {
        what.to_string()
    } else {
        format!("{}: {}", what, message)
    };

    match status {
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
        _ => BackendError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: Response, what: &str) -> BackendResult<T> {
    response
        .json()
        .map_err(|e| BackendError::InvalidResponse(format!("{}: {}", what, e)))
}

impl ImageBackend for HttpBackend {
    fn list_images(&self) -> BackendResult<Vec<ImageRecord>> {
        let response = self.send(self.client.get(self.api("images")), "list images")?;
        decode(response, "list images")
    }

    fn upload_images(&self, files: &[UploadFile]) -> BackendResult<Vec<ImageRecord>> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(file.mime)
                .map_err(|e| BackendError::InvalidResponse(format!("{}: {}", file.name, e)))?;
            form = form.part("images", part);
        }

        let request = self.client.post(self.api("images/upload")).multipart(form);
        let response = self.send(request, "upload images")?;
        let records: Vec<ImageRecord> = decode(response, "upload images")?;
        log::info!("Uploaded {} image(s)", records.len());
        Ok(records)
    }

    fn save_boxes(&self, image_id: &str, boxes: &[BoundingBox]) -> BackendResult<ImageRecord> {
        let url = self.api(&format!("images/{}/boxes", image_id));
        let body = SaveBoxesBody {
            bounding_boxes: boxes,
        };
        let response = self.send(self.client.put(url).json(&body), "save boxes")?;
        decode(response, "save boxes")
    }

    fn delete_image(&self, image_id: &str) -> BackendResult<()> {
        let url = self.api(&format!("images/{}", image_id));
        self.send(self.client.delete(url), "delete image")?;
        Ok(())
    }

    fn fetch_image_bytes(&self, path: &str) -> BackendResult<Vec<u8>> {
        let response = self.send(self.client.get(self.asset_url(path)), "fetch image")?;
        let bytes = response
            .bytes()
            .map_err(|e| BackendError::Network(format!("Failed to read image: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serve one canned response on a loopback port and hand back the raw
    /// request that was received.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            let header_end = loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break request.len();
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = find(&request, b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while request.len() < header_end + content_length {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(String::from_utf8_lossy(&request).to_string()).unwrap();
        });

        (format!("http://{}", addr), rx)
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn backend_for(server_url: String) -> HttpBackend {
        let config = AppConfig {
            server_url,
            auth_token: Some("secret".to_string()),
            ..AppConfig::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn test_urls() {
        let backend = backend_for("http://localhost:5000/".to_string());
        assert_eq!(backend.api("images"), "http://localhost:5000/api/images");
        assert_eq!(
            backend.asset_url("/uploads/1-cat.png"),
            "http://localhost:5000/uploads/1-cat.png"
        );
        assert_eq!(
            backend.asset_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_status_mapping() {
        let err = status_error(StatusCode::NOT_FOUND, "save boxes", r#"{"message":"Image not found"}"#);
        assert!(matches!(err, BackendError::NotFound(ref m) if m == "save boxes: Image not found"));
        assert!(!err.is_retryable());

        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "save boxes", "");
        assert!(matches!(err, BackendError::Status { status: 500, .. }));
        assert!(err.is_retryable());

        let err = status_error(StatusCode::UNAUTHORIZED, "list images", "no token");
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    #[test]
    fn test_save_empty_list_sends_put() {
        let (url, requests) = serve_once(
            "200 OK",
            r#"{"_id":"img1","path":"/uploads/a.png","boundingBoxes":[]}"#,
        );
        let backend = backend_for(url);

        let record = backend.save_boxes("img1", &[]).unwrap();
        assert_eq!(record.id, "img1");
        assert!(record.bounding_boxes.is_empty());

        let request = requests.recv().unwrap();
        assert!(request.starts_with("PUT /api/images/img1/boxes HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-auth-token: secret"));
        assert!(request.ends_with(r#"{"boundingBoxes":[]}"#));
    }

    #[test]
    fn test_list_images_decodes_records() {
        let (url, requests) = serve_once(
            "200 OK",
            r#"[
                {"_id":"a","path":"/uploads/a.png","filename":"a.png",
                 "boundingBoxes":[{"x":1,"y":2,"width":3,"height":4,"label":"dog"}],
                 "uploadDate":"2024-05-01T10:00:00.000Z"},
                {"_id":"b","path":"/uploads/b.jpg"}
            ]"#,
        );
        let backend = backend_for(url);

        let images = backend.list_images().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].id, "a");
        assert_eq!(images[0].bounding_boxes.len(), 1);
        assert_eq!(images[0].bounding_boxes[0].label.as_deref(), Some("dog"));
        assert!(images[1].bounding_boxes.is_empty());

        let request = requests.recv().unwrap();
        assert!(request.starts_with("GET /api/images HTTP/1.1"));
        assert!(request.to_lowercase().contains("x-auth-token: secret"));
    }

    #[test]
    fn test_upload_sends_multipart_images_field() {
        let (url, requests) = serve_once(
            "201 Created",
            r#"[{"_id":"new1","path":"/uploads/1-cat.png","filename":"cat.png","boundingBoxes":[]}]"#,
        );
        let backend = backend_for(url);
        let files = [UploadFile {
            name: "cat.png".to_string(),
            mime: "image/png",
            bytes: b"fake png payload".to_vec(),
        }];

        let records = backend.upload_images(&files).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "new1");
        assert_eq!(records[0].display_name(), "cat.png");

        let request = requests.recv().unwrap();
        let lower = request.to_lowercase();
        assert!(request.starts_with("POST /api/images/upload HTTP/1.1"));
        assert!(lower.contains("x-auth-token: secret"));
        assert!(lower.contains("content-type: multipart/form-data; boundary="));
        assert!(request.contains(r#"name="images"; filename="cat.png""#));
        assert!(lower.contains("content-type: image/png"));
        assert!(request.contains("fake png payload"));
    }

    #[test]
    fn test_save_reports_missing_image() {
        let (url, _requests) = serve_once("404 Not Found", r#"{"message":"Image not found"}"#);
        let backend = backend_for(url);

        let err = backend
            .save_boxes("gone", &[BoundingBox::new(1.0, 1.0, 2.0, 2.0)])
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[test]
    fn test_unreachable_server_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = backend_for(format!("http://{}", addr));
        let err = backend.list_images().unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
        assert!(err.is_retryable());
    }
}

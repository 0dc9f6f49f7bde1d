// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Marketplace API transport.
//!
//! Handles:
//! - Resolving endpoint paths against the configured base URL
//! - Bearer token attachment from the persisted session
//! - JSON vs multipart body encoding
//! - Normalizing non-2xx responses into `AppError::Api`
//! - 204 responses, which carry no body

use crate::error::{AppError, Result};
use crate::storage::SessionStorage;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Content type of JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A file attached to a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name (the API expects `image`)
    pub field: String,
    pub file_name: String,
    /// MIME type, e.g. `image/jpeg`
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Read a file from disk, guessing the MIME type from its extension.
    pub fn from_path(field: &str, path: &std::path::Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| AppError::Validation(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jpg" | "jpeg") => Some("image/jpeg"),
            Some("png") => Some("image/png"),
            Some("webp") => Some("image/webp"),
            Some("gif") => Some("image/gif"),
            _ => None,
        };

        Ok(Self {
            field: field.to_string(),
            file_name,
            content_type: content_type.map(str::to_string),
            bytes,
        })
    }
}

/// Form fields plus an optional file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    fields: Vec<(String, String)>,
    file: Option<FilePart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, file: FilePart) -> Self {
        self.file = Some(file);
        self
    }

    /// Value of the first text field called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn file_part(&self) -> Option<&FilePart> {
        self.file.as_ref()
    }

    fn into_form(self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        if let Some(file) = self.file {
            let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = file.content_type {
                part = part
                    .mime_str(&mime)
                    .map_err(|e| AppError::Validation(format!("Invalid file type: {}", e)))?;
            }
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// Request body, tagged with its encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartPayload),
}

impl Payload {
    /// Content type the caller sets for this body.
    ///
    /// `None` for multipart: the HTTP client writes the header itself so it
    /// can include the boundary.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Payload::Json(_) => Some(JSON_CONTENT_TYPE),
            Payload::Multipart(_) => None,
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Payload::Multipart(_))
    }
}

/// One call against the marketplace API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Endpoint path relative to the API base, e.g. `/products/mine`
    pub path: String,
    pub payload: Option<Payload>,
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json(self, value: Value) -> Self {
        self.with_payload(Payload::Json(value))
    }

    pub fn with_multipart(self, payload: MultipartPayload) -> Self {
        self.with_payload(Payload::Multipart(payload))
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Headers the caller controls: the encoding's content type followed by
    /// overrides. A multipart body never gets a caller `Content-Type`.
    pub fn caller_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ct) = self.payload.as_ref().and_then(Payload::content_type) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
        if self.payload.as_ref().is_some_and(Payload::is_multipart) {
            headers.remove(CONTENT_TYPE);
        }
        headers
    }
}

/// Build an endpoint path from a prefix and an id, percent-encoding the id.
pub fn resource_path(prefix: &str, id: &str) -> String {
    format!("{}/{}", prefix, urlencoding::encode(id))
}

/// Body returned in place of a 204 response.
pub fn no_content() -> Value {
    serde_json::json!({ "success": true, "message": "No Content" })
}

/// The single request function both stores talk through.
pub trait Transport: Send + Sync {
    /// Send a request and return the parsed JSON body.
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<Value>> + Send {
        (**self).send(request)
    }
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStorage>,
}

impl HttpTransport {
    /// Create a transport against `base_url`, reading bearer tokens from `session`.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStorage>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the `reqwest` request without sending it.
    pub fn build(&self, request: ApiRequest) -> Result<reqwest::Request> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut headers = request.caller_headers();

        if let Some(token) = self.session.token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Validation(format!("Invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.http.request(request.method, &url).headers(headers);
        builder = match request.payload {
            None => builder,
            Some(Payload::Json(value)) => builder.body(serde_json::to_vec(&value)?),
            Some(Payload::Multipart(payload)) => builder.multipart(payload.into_form()?),
        };

        Ok(builder.build()?)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(no_content());
        }

        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).ok();
            return Err(AppError::from_status(status.as_u16(), body));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Decode(format!("JSON parse error: {}", e)))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let endpoint = request.path.clone();
        let method = request.method.clone();
        tracing::debug!(%method, endpoint = %endpoint, "API request");

        let result = match self.build(request) {
            Ok(built) => match self.http.execute(built).await {
                Ok(response) => self.check_response_json(response).await,
                Err(e) => Err(AppError::from(e)),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!(
                endpoint = %endpoint,
                status = ?e.status(),
                error = %e,
                "API fetch error"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use serde_json::json;

    fn transport() -> HttpTransport {
        let session = Arc::new(SessionStorage::new(LocalStorage::new_in_memory()));
        HttpTransport::new("http://localhost:3000/api/", session)
    }

    #[test]
    fn test_json_payload_sets_content_type() {
        let request = ApiRequest::put("/products/p1").with_json(json!({"stock": 3}));
        let headers = request.caller_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_multipart_drops_caller_content_type() {
        let request = ApiRequest::put("/products/p1")
            .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .with_multipart(MultipartPayload::new().text("stock", "3"));
        assert!(request.caller_headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_build_multipart_uses_client_boundary() {
        let request = ApiRequest::post("/products")
            .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .with_multipart(MultipartPayload::new().text("name", "Meja"));

        let built = transport().build(request).unwrap();
        let ct = built.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(ct.starts_with("multipart/form-data; boundary="));
        assert_eq!(built.url().as_str(), "http://localhost:3000/api/products");
    }

    #[test]
    fn test_build_without_session_has_no_authorization() {
        let built = transport().build(ApiRequest::get("/products/available")).unwrap();
        assert!(built.headers().get(AUTHORIZATION).is_none());
        assert!(built.headers().get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_send_reports_build_failure() {
        let session = Arc::new(SessionStorage::new(LocalStorage::new_in_memory()));
        let http = HttpTransport::new("http://localhost:3000/api", session);
        let request = ApiRequest::post("/products").with_multipart(
            MultipartPayload::new().file(FilePart {
                field: "image".to_string(),
                file_name: "x.bin".to_string(),
                content_type: Some("not a mime type".to_string()),
                bytes: vec![1],
            }),
        );

        let err = http.send(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_resource_path_encodes_id() {
        assert_eq!(resource_path("/products", "a b/c"), "/products/a%20b%2Fc");
    }
}

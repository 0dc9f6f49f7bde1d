// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use recycle_market::config::Config;
use recycle_market::error::{AppError, Result};
use recycle_market::models::Identity;
use recycle_market::services::transport::{no_content, ApiRequest, Transport};
use recycle_market::storage::{LocalStorage, SessionStorage};
use recycle_market::AppState;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned answer for one route of the stub API.
#[derive(Clone)]
#[allow(dead_code)]
pub enum StubReply {
    Status {
        status: u16,
        body: Option<Value>,
        delay: Duration,
    },
    NetworkDown,
}

#[allow(dead_code)]
impl StubReply {
    pub fn ok(body: Value) -> Self {
        StubReply::Status {
            status: 200,
            body: Some(body),
            delay: Duration::ZERO,
        }
    }

    pub fn no_content() -> Self {
        StubReply::Status {
            status: 204,
            body: None,
            delay: Duration::ZERO,
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        StubReply::Status {
            status,
            body: Some(json!({ "message": message })),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(self, by: Duration) -> Self {
        match self {
            StubReply::Status { status, body, .. } => StubReply::Status {
                status,
                body,
                delay: by,
            },
            other => other,
        }
    }
}

/// In-process transport: answers from a route table and records every call.
#[derive(Default)]
#[allow(dead_code)]
pub struct StubTransport {
    routes: Mutex<HashMap<(Method, String), Vec<StubReply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

#[allow(dead_code)]
impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply for `method path`. Replies are used in order; the last
    /// one repeats.
    pub fn on(&self, method: Method, path: &str, reply: StubReply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push(reply);
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_reply(&self, method: &Method, path: &str) -> Option<StubReply> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&(method.clone(), path.to_string()))?;
        if queue.len() > 1 {
            Some(queue.remove(0))
        } else {
            queue.first().cloned()
        }
    }
}

impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        self.calls.lock().unwrap().push(request.clone());

        let reply = self
            .next_reply(&request.method, &request.path)
            .unwrap_or_else(|| StubReply::error(404, "Not found"));

        match reply {
            StubReply::NetworkDown => Err(AppError::Network("connection refused".to_string())),
            StubReply::Status {
                status,
                body,
                delay,
            } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                match status {
                    204 => Ok(no_content()),
                    200..=299 => Ok(body.unwrap_or(Value::Null)),
                    _ => Err(AppError::from_status(status, body)),
                }
            }
        }
    }
}

#[allow(dead_code)]
pub fn seller() -> Identity {
    Identity {
        id: "1".to_string(),
        name: "Sari".to_string(),
        email: "seller@x.com".to_string(),
        phone: "0812-3456-789".to_string(),
        location: "Bandung".to_string(),
        is_super_admin: false,
        token: "tok".to_string(),
    }
}

#[allow(dead_code)]
pub fn super_admin() -> Identity {
    Identity {
        id: "99".to_string(),
        name: "Root".to_string(),
        email: "root@x.com".to_string(),
        phone: "0800".to_string(),
        location: "Jakarta".to_string(),
        is_super_admin: true,
        token: "root-tok".to_string(),
    }
}

#[allow(dead_code)]
pub fn product_json(id: &str, admin_id: &str, stock: u32) -> Value {
    let status = if stock > 0 { "available" } else { "sold" };
    json!({
        "id": id,
        "adminId": admin_id,
        "name": format!("Barang {}", id),
        "description": "Bekas tapi layak pakai",
        "price": "50000",
        "image": format!("/uploads/{}.jpg", id),
        "location": "Bandung",
        "stock": stock,
        "status": status,
        "sellerName": "Sari",
        "sellerPhone": "0812-3456-789"
    })
}

/// In-memory session storage, optionally pre-seeded with an identity.
#[allow(dead_code)]
pub fn test_storage(identity: Option<&Identity>) -> Arc<SessionStorage> {
    let storage = Arc::new(SessionStorage::new(LocalStorage::new_in_memory()));
    if let Some(identity) = identity {
        storage.save(identity).expect("seed session");
    }
    storage
}

/// App state wired to a stub transport.
#[allow(dead_code)]
pub fn create_test_state(
    identity: Option<&Identity>,
) -> (AppState<StubTransport>, Arc<StubTransport>, Arc<SessionStorage>) {
    let transport = StubTransport::new();
    let storage = test_storage(identity);
    let state = AppState::with_transport(Config::test_default(), transport.clone(), storage.clone());
    (state, transport, storage)
}

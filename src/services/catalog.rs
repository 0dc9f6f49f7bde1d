// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog store: the locally cached slice of products and the CRUD calls
//! that keep it in step with the server.
//!
//! The cache is replaced wholesale by every fetch. Mutations touch it only
//! after the server confirms, so a failed call leaves it exactly as it was.
//!
//! Fetches carry a sequence number; a response that arrives after a newer
//! fetch was issued is dropped instead of overwriting the newer data.

use crate::error::{AppError, Result};
use crate::models::product::{parse_stock, validate_stock_value};
use crate::models::Product;
use crate::services::notice::{Notice, NoticeSlot};
use crate::services::transport::{resource_path, ApiRequest, MultipartPayload, Payload, Transport};
use crate::storage::SessionStorage;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Which product slice a fetch loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogView {
    /// Public storefront listing
    Available,
    /// Products owned by the signed-in seller
    Mine,
    /// Every product (super-admin only)
    All,
}

impl CatalogView {
    pub fn endpoint(self) -> &'static str {
        match self {
            CatalogView::Available => "/products/available",
            CatalogView::Mine => "/products/mine",
            CatalogView::All => "/products/all",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            CatalogView::Available => "Failed to load available products.",
            CatalogView::Mine => "Failed to load your products. Your session may have expired.",
            CatalogView::All => "Failed to load all products. Your session may have expired.",
        }
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    products: Vec<Product>,
    /// Fetches issued but not yet settled
    in_flight: usize,
    error: Option<String>,
}

/// Owns the cached product list, the loading flag and the error slot.
pub struct CatalogStore<T: Transport> {
    transport: T,
    session: Arc<SessionStorage>,
    state: RwLock<CatalogState>,
    fetch_seq: AtomicU64,
    notice: NoticeSlot,
}

impl<T: Transport> CatalogStore<T> {
    pub fn new(transport: T, session: Arc<SessionStorage>) -> Self {
        Self {
            transport,
            session,
            state: RwLock::new(CatalogState::default()),
            fetch_seq: AtomicU64::new(0),
            notice: NoticeSlot::default(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Snapshot accessors ──────────────────────────────────────

    /// Cached products in display order.
    pub fn products(&self) -> Vec<Product> {
        self.read().products.clone()
    }

    /// True while any fetch is in flight.
    pub fn loading(&self) -> bool {
        self.read().in_flight > 0
    }

    /// Message of the last failed fetch, cleared when a new fetch starts.
    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notice.get()
    }

    /// Cached products owned by `admin_id`. No request is made.
    pub fn get_products_by_admin(&self, admin_id: &str) -> Vec<Product> {
        self.read()
            .products
            .iter()
            .filter(|p| p.admin_id == admin_id)
            .cloned()
            .collect()
    }

    /// Cached products whose name or description contains `term`,
    /// ignoring case. A blank term matches everything.
    pub fn search(&self, term: &str) -> Vec<Product> {
        let term = term.trim();
        self.read()
            .products
            .iter()
            .filter(|p| term.is_empty() || p.matches(term))
            .cloned()
            .collect()
    }

    // ─── Fetches ─────────────────────────────────────────────────

    /// Load the public storefront listing.
    pub async fn fetch_available_products(&self) -> bool {
        self.fetch(CatalogView::Available).await
    }

    /// Load the signed-in seller's own products.
    pub async fn fetch_my_products(&self) -> bool {
        self.fetch(CatalogView::Mine).await
    }

    /// Load every product. Refused locally unless the session is super-admin;
    /// a refusal sets the error slot and keeps the cached list.
    pub async fn fetch_all_products(&self) -> bool {
        if !self.session.is_super_admin() {
            let err = AppError::Forbidden("only a super-admin can view all products".to_string());
            self.write().error = Some(err.to_string());
            return self.reject(err);
        }
        self.fetch(CatalogView::All).await
    }

    /// Replace the cache with `view`.
    ///
    /// Returns true when the response was applied. A failure empties the
    /// cache and sets the error slot; a superseded response changes nothing
    /// and returns false.
    pub async fn fetch(&self, view: CatalogView) -> bool {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.write();
            state.in_flight += 1;
            state.error = None;
        }

        let result = self
            .transport
            .send(ApiRequest::get(view.endpoint()))
            .await
            .and_then(|value| Ok(serde_json::from_value::<Vec<Product>>(value)?));

        let mut state = self.write();
        state.in_flight = state.in_flight.saturating_sub(1);

        if seq != self.fetch_seq.load(Ordering::SeqCst) {
            tracing::debug!(
                endpoint = view.endpoint(),
                seq,
                "Discarding superseded fetch response"
            );
            return false;
        }

        match result {
            Ok(products) => {
                tracing::debug!(endpoint = view.endpoint(), count = products.len(), "Catalog loaded");
                state.products = products;
                true
            }
            Err(e) => {
                tracing::error!(endpoint = view.endpoint(), error = %e, "Error fetching products");
                state.error = Some(view.failure_message().to_string());
                state.products.clear();
                false
            }
        }
    }

    // ─── Mutations ───────────────────────────────────────────────

    /// Create a product from a multipart form (fields plus image file).
    /// The new product goes to the front of the cache.
    pub async fn add_product(&self, payload: MultipartPayload) -> bool {
        if let Err(e) = check_multipart_stock(&payload) {
            return self.reject(e);
        }

        let result = self
            .transport
            .send(ApiRequest::post("/products").with_multipart(payload))
            .await
            .and_then(|value| Ok(serde_json::from_value::<Product>(value)?));

        match result {
            Ok(product) => {
                tracing::info!(product_id = %product.id, "Product added");
                let mut state = self.write();
                state.products.retain(|p| p.id != product.id);
                state.products.insert(0, product);
                drop(state);
                self.notice.success("Product added.");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Error adding product");
                self.notice.error(e.user_message("Failed to add product."));
                false
            }
        }
    }

    /// Update a product with a multipart form (new image) or a JSON partial.
    /// The matching cached entry is replaced in place.
    pub async fn update_product(&self, id: &str, payload: Payload) -> bool {
        let checked = match &payload {
            Payload::Json(value) => check_json_stock(value),
            Payload::Multipart(form) => check_multipart_stock(form),
        };
        if let Err(e) = checked {
            return self.reject(e);
        }

        let result = self
            .transport
            .send(ApiRequest::put(resource_path("/products", id)).with_payload(payload))
            .await
            .and_then(|value| Ok(serde_json::from_value::<Product>(value)?));

        match result {
            Ok(updated) => {
                tracing::info!(product_id = %updated.id, "Product updated");
                let mut state = self.write();
                if let Some(slot) = state.products.iter_mut().find(|p| p.id == updated.id) {
                    *slot = updated;
                }
                drop(state);
                self.notice.success("Product updated.");
                true
            }
            Err(e) => {
                tracing::error!(product_id = %id, error = %e, "Error updating product");
                self.notice.error(e.user_message("Failed to update product."));
                false
            }
        }
    }

    /// Set the stock of a product from raw user input.
    pub async fn update_stock(&self, id: &str, raw: &str) -> bool {
        match parse_stock(raw) {
            Ok(stock) => {
                self.update_product(id, Payload::Json(serde_json::json!({ "stock": stock })))
                    .await
            }
            Err(e) => self.reject(e),
        }
    }

    /// Delete a product and drop it from the cache.
    ///
    /// Deleting an id that is not cached only affects the server.
    pub async fn delete_product(&self, id: &str) -> bool {
        match self
            .transport
            .send(ApiRequest::delete(resource_path("/products", id)))
            .await
        {
            Ok(_) => {
                tracing::info!(product_id = %id, "Product deleted");
                self.write().products.retain(|p| p.id != id);
                self.notice.success("Product deleted.");
                true
            }
            Err(e) => {
                tracing::error!(product_id = %id, error = %e, "Error deleting product");
                self.notice.error(e.user_message("Failed to delete product."));
                false
            }
        }
    }

    /// Report a local pre-flight rejection the same way as a server failure.
    fn reject(&self, err: AppError) -> bool {
        tracing::warn!(error = %err, "Request rejected before sending");
        self.notice.error(err.to_string());
        false
    }
}

fn check_json_stock(value: &Value) -> Result<()> {
    match value.get("stock") {
        Some(stock) => validate_stock_value(stock).map(|_| ()),
        None => Ok(()),
    }
}

fn check_multipart_stock(payload: &MultipartPayload) -> Result<()> {
    match payload.field("stock") {
        Some(stock) => parse_stock(stock).map(|_| ()),
        None => Ok(()),
    }
}

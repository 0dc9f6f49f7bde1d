// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ReCycle Market: client core for the second-hand marketplace
//!
//! This crate provides the session and catalog stores used by the
//! storefront and the seller/admin console, and the API transport they share.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

use config::Config;
use services::{CatalogStore, HttpTransport, SessionStore, Transport};
use std::sync::Arc;
use storage::{LocalStorage, SessionStorage};

/// Shared application state: both stores, built once and passed down.
pub struct AppState<T: Transport> {
    pub config: Config,
    pub session: SessionStore<Arc<T>>,
    pub catalog: CatalogStore<Arc<T>>,
}

impl AppState<HttpTransport> {
    /// Wire the stores to the configured API and on-disk session.
    pub fn new(config: Config) -> Self {
        let storage = Arc::new(SessionStorage::new(LocalStorage::new(&config.state_dir)));
        let transport = Arc::new(HttpTransport::new(&config.api_url, storage.clone()));
        Self::with_transport(config, transport, storage)
    }
}

impl<T: Transport> AppState<T> {
    /// Wire the stores to an arbitrary transport (tests use stubs).
    pub fn with_transport(config: Config, transport: Arc<T>, storage: Arc<SessionStorage>) -> Self {
        Self {
            session: SessionStore::new(transport.clone(), storage.clone()),
            catalog: CatalogStore::new(transport, storage),
            config,
        }
    }

    /// Log out and drop the cached catalog slice that belonged to the session.
    pub async fn logout(&self) -> bool {
        self.session.logout();
        self.catalog.fetch_available_products().await
    }
}

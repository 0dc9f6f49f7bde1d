// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: who is signed in, and the super-admin account roster.
//!
//! Operations never hand errors to the caller. They log the failure, record
//! an error notice and return `false` (or an empty list).

use crate::error::AppError;
use crate::models::identity::AuthResponse;
use crate::models::product::first_validation_message;
use crate::models::{AdminAccount, Identity};
use crate::services::notice::{Notice, NoticeSlot};
use crate::services::transport::{resource_path, ApiRequest, Transport};
use crate::storage::SessionStorage;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use validator::Validate;

/// Seller sign-up form.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required."))]
    pub phone: String,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// Owns the authenticated identity and mirrors it to durable storage.
pub struct SessionStore<T: Transport> {
    transport: T,
    storage: Arc<SessionStorage>,
    identity: RwLock<Option<Identity>>,
    notice: NoticeSlot,
}

impl<T: Transport> SessionStore<T> {
    /// Create the store, rehydrating any persisted identity.
    pub fn new(transport: T, storage: Arc<SessionStorage>) -> Self {
        let identity = storage.load();
        if let Some(identity) = &identity {
            tracing::info!(admin_id = %identity.id, "Restored persisted session");
        }

        Self {
            transport,
            storage,
            identity: RwLock::new(identity),
            notice: NoticeSlot::default(),
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn is_super_admin(&self) -> bool {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|identity| identity.is_super_admin)
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notice.get()
    }

    /// Create a seller account. Does not sign in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        location: &str,
        password: &str,
    ) -> bool {
        let form = Registration {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
            location: location.trim().to_string(),
            password: password.to_string(),
        };

        if let Err(e) = form.validate() {
            self.notice.error(first_validation_message(&e));
            return false;
        }

        let body = match serde_json::to_value(&form) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode registration");
                self.notice.error("Registration failed.");
                return false;
            }
        };

        match self
            .transport
            .send(ApiRequest::post("/auth/register").with_json(body))
            .await
        {
            Ok(_) => {
                tracing::info!(email = %form.email, "Seller account registered");
                self.notice
                    .success("Registration successful. Please sign in.");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Register error");
                self.notice.error(e.user_message("Registration failed."));
                false
            }
        }
    }

    /// Sign in and persist the resulting identity.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let body = serde_json::json!({ "email": email.trim(), "password": password });

        let identity = match self
            .transport
            .send(ApiRequest::post("/auth/login").with_json(body))
            .await
            .and_then(|value| Ok(serde_json::from_value::<AuthResponse>(value)?))
        {
            Ok(resp) => Identity::from(resp),
            Err(e) => {
                tracing::error!(error = %e, "Login error");
                self.notice.error(e.user_message("Login failed."));
                return false;
            }
        };

        if let Err(e) = self.storage.save(&identity) {
            tracing::error!(error = %e, "Failed to persist session");
            self.notice.error("Login failed: could not save the session.");
            return false;
        }

        tracing::info!(
            admin_id = %identity.id,
            super_admin = identity.is_super_admin,
            "Logged in"
        );
        self.notice.success(format!("Welcome, {}!", identity.name));
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Some(identity);
        true
    }

    /// Forget the identity locally. No request is made.
    pub fn logout(&self) {
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.storage.clear();
        tracing::info!("Logged out");
    }

    /// Every account on the marketplace. Empty unless signed in as super-admin.
    pub async fn fetch_all_admins(&self) -> Vec<AdminAccount> {
        if !self.is_super_admin() {
            tracing::debug!("Skipping admin roster fetch: not a super-admin");
            return Vec::new();
        }

        match self
            .transport
            .send(ApiRequest::get("/auth/admins"))
            .await
            .and_then(|value| Ok(serde_json::from_value::<Vec<AdminAccount>>(value)?))
        {
            Ok(admins) => admins,
            Err(e) => {
                tracing::error!(error = %e, "Error fetching admin accounts");
                self.notice
                    .error(e.user_message("Failed to load seller accounts."));
                Vec::new()
            }
        }
    }

    /// The roster without super-admin accounts.
    pub async fn fetch_sellers(&self) -> Vec<AdminAccount> {
        self.fetch_all_admins()
            .await
            .into_iter()
            .filter(|admin| !admin.is_super_admin)
            .collect()
    }

    /// Delete a seller account. Callers refresh any dependent lists.
    pub async fn delete_admin_account(&self, id: &str) -> bool {
        if !self.is_super_admin() {
            let err = AppError::Forbidden("only a super-admin can delete accounts".to_string());
            tracing::warn!(admin_id = %id, error = %err, "Refusing account deletion");
            self.notice.error(err.to_string());
            return false;
        }

        match self
            .transport
            .send(ApiRequest::delete(resource_path("/auth/admins", id)))
            .await
        {
            Ok(_) => {
                tracing::info!(admin_id = %id, "Admin account deleted");
                self.notice.success("Account deleted.");
                true
            }
            Err(e) => {
                tracing::error!(admin_id = %id, error = %e, "Error deleting admin account");
                self.notice.error(e.user_message("Failed to delete account."));
                false
            }
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Durable local storage and the persisted session record.
//!
//! Provides:
//! - `LocalStorage`: string key/value store, file-backed or in-memory
//! - `SessionStorage`: the identity record under a fixed key, with the
//!   versioned codec and the migration of older records

use crate::error::{AppError, Result};
use crate::models::Identity;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Storage key of the persisted identity.
pub const SESSION_KEY: &str = "currentAdmin";

/// Current on-disk version of the session record.
pub const SESSION_RECORD_VERSION: u64 = 1;

enum Backend {
    File(PathBuf),
    Memory(DashMap<String, String>),
}

/// String key/value storage that outlives the process (or, in tests, doesn't).
pub struct LocalStorage {
    backend: Backend,
}

impl LocalStorage {
    /// File-backed storage; one file per key inside `dir`.
    ///
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::File(dir.into()),
        }
    }

    /// In-memory storage for tests.
    pub fn new_in_memory() -> Self {
        Self {
            backend: Backend::Memory(DashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match &self.backend {
            Backend::Memory(map) => Ok(map.get(key).map(|v| v.value().clone())),
            Backend::File(dir) => match std::fs::read_to_string(key_path(dir, key)) {
                Ok(contents) => Ok(Some(contents)),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                // Non-UTF-8 contents are as good as corrupt; surface them as a value
                // the codec will reject rather than as an I/O failure.
                Err(e) if e.kind() == ErrorKind::InvalidData => Ok(Some(String::new())),
                Err(e) => Err(AppError::Storage(format!("Failed to read {}: {}", key, e))),
            },
        }
    }

    /// Write `value` under `key`, replacing any previous value atomically.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        match &self.backend {
            Backend::Memory(map) => {
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
            Backend::File(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| {
                    AppError::Storage(format!("Failed to create {}: {}", dir.display(), e))
                })?;
                let target = key_path(dir, key);
                let tmp = target.with_extension("json.tmp");
                std::fs::write(&tmp, value)
                    .and_then(|_| std::fs::rename(&tmp, &target))
                    .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", key, e)))
            }
        }
    }

    /// Remove `key`. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        match &self.backend {
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
            Backend::File(dir) => match std::fs::remove_file(key_path(dir, key)) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(AppError::Storage(format!("Failed to remove {}: {}", key, e))),
            },
        }
    }
}

fn key_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

/// Version 1 envelope around the identity.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    version: u64,
    saved_at: DateTime<Utc>,
    identity: Identity,
}

/// Encode an identity as the current record version.
pub fn encode_session(identity: &Identity) -> Result<String> {
    let record = SessionRecord {
        version: SESSION_RECORD_VERSION,
        saved_at: Utc::now(),
        identity: identity.clone(),
    };
    Ok(serde_json::to_string(&record)?)
}

/// Decode a persisted record, migrating older layouts.
///
/// Records without a `version` are the flat identity objects written by
/// earlier clients; they may lack `isSuperAdmin`, which migrates to `false`.
pub fn decode_session(raw: &str) -> Result<Identity> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(mut fields) = value else {
        return Err(AppError::Decode("session record is not an object".to_string()));
    };

    let version = fields.get("version").map(Value::as_u64);
    match version {
        None => {
            fields
                .entry("isSuperAdmin")
                .or_insert(Value::Bool(false));
            Ok(serde_json::from_value(Value::Object(fields))?)
        }
        Some(Some(SESSION_RECORD_VERSION)) => {
            let record: SessionRecord = serde_json::from_value(Value::Object(fields))?;
            Ok(record.identity)
        }
        Some(other) => Err(AppError::Decode(format!(
            "unsupported session record version {:?}",
            other
        ))),
    }
}

/// The persisted identity, shared by the session store, the catalog's role
/// gate and the transport's bearer header.
pub struct SessionStorage {
    storage: LocalStorage,
    /// Set by `clear`, reset by `save`. While set, a record that could not
    /// be removed is ignored.
    cleared: AtomicBool,
}

impl SessionStorage {
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            cleared: AtomicBool::new(false),
        }
    }

    /// Read the persisted identity.
    ///
    /// Anything that fails to decode is removed and reported as absent.
    pub fn load(&self) -> Option<Identity> {
        if self.cleared.load(Ordering::SeqCst) {
            return None;
        }

        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted session");
                return None;
            }
        };

        match decode_session(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt persisted session");
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, identity: &Identity) -> Result<()> {
        self.storage.set(SESSION_KEY, &encode_session(identity)?)?;
        self.cleared.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Remove the persisted identity. Failures are logged, never returned.
    ///
    /// If the record cannot be removed it is overwritten with an empty value,
    /// which the next process to load it discards as corrupt.
    pub fn clear(&self) {
        self.cleared.store(true, Ordering::SeqCst);

        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "Failed to remove persisted session");
            if let Err(e) = self.storage.set(SESSION_KEY, "") {
                tracing::error!(error = %e, "Failed to blank persisted session");
            }
        }
    }

    /// Bearer token of the persisted identity, if any.
    pub fn token(&self) -> Option<String> {
        self.load().map(|identity| identity.token)
    }

    pub fn is_super_admin(&self) -> bool {
        self.load().is_some_and(|identity| identity.is_super_admin)
    }

    /// Raw access for tests and tooling that need to plant a record.
    pub fn local(&self) -> &LocalStorage {
        &self.storage
    }
}

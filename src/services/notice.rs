// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User-facing outcome messages (the console's toasts).

use serde::Serialize;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Message describing how the last operation went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Holds the most recent notice of a store.
#[derive(Debug, Default)]
pub struct NoticeSlot {
    last: RwLock<Option<Notice>>,
}

impl NoticeSlot {
    pub fn success(&self, message: impl Into<String>) {
        self.set(NoticeLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.set(NoticeLevel::Error, message.into());
    }

    pub fn get(&self) -> Option<Notice> {
        self.last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, level: NoticeLevel, message: String) {
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = Some(Notice { level, message });
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the client core.

pub mod catalog;
pub mod notice;
pub mod session;
pub mod transport;

pub use catalog::{CatalogStore, CatalogView};
pub use notice::{Notice, NoticeLevel};
pub use session::SessionStore;
pub use transport::{ApiRequest, FilePart, HttpTransport, MultipartPayload, Payload, Transport};

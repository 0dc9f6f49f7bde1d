// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the client core.

pub mod identity;
pub mod phone;
pub mod product;

pub use identity::{AdminAccount, Identity};
pub use product::{NewProduct, Product};

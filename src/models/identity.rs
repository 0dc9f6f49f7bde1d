// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated identity and the seller roster entries.

use super::product::Product;
use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The authenticated principal: a seller or a super-admin.
///
/// Either fully present or absent; there is no partially populated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub is_super_admin: bool,
    /// Bearer credential for authorized calls
    pub token: String,
}

impl Identity {
    /// Whether this identity may edit or delete `product`.
    ///
    /// Convenience filter for the UI; the server makes the real decision.
    pub fn can_manage(&self, product: &Product) -> bool {
        self.is_super_admin || product.admin_id == self.id
    }
}

/// Login/register response body.
///
/// Only `id` and `token` are mandatory; profile fields the server leaves out
/// become empty strings and the role flag defaults to `false`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_super_admin: bool,
    pub token: String,
}

impl From<AuthResponse> for Identity {
    fn from(r: AuthResponse) -> Self {
        Self {
            id: r.id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            location: r.location,
            is_super_admin: r.is_super_admin,
            token: r.token,
        }
    }
}

/// An account as listed in the super-admin roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccount {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_super_admin: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Accept ids as JSON strings or numbers; they are opaque either way.
pub(crate) fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawId::deserialize(deserializer)?.into())
}

/// Like `opaque_id`, but `null` becomes an empty string.
pub(crate) fn optional_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

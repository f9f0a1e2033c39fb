//! Core domain types for the login session store.
//!
//! Persons, accounts, sessions, and groups live in the triple store as
//! facts; these types are the lightweight handles returned to callers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identifiers ───────────────────────────────────────────────────

/// Opaque identifier stored as `mu:uuid` on every resource this crate creates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResourceId(pub Uuid);

impl ResourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The resource URI for this id under the given base URI.
    pub fn uri_under(&self, base: &str) -> String {
        format!("{base}{}", self.0)
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Claims ────────────────────────────────────────────────────────

/// Identity claims asserted by the identity provider.
///
/// Missing fields deserialize to empty strings; callers are expected to
/// validate claims before handing them over.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Stable external account identifier.
    #[serde(default)]
    pub vo_id: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    /// National registry number.
    #[serde(default)]
    pub rrn: String,
    /// Any further claims, kept so the full assertion can be passed through.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Resolved references ───────────────────────────────────────────

/// An `foaf:OnlineAccount` resolved from the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub account_uri: String,
    pub account_id: String,
}

/// A session as written by the session store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRef {
    pub session_uri: String,
    pub session_id: String,
}

/// A `besluit:Bestuurseenheid` looked up by its OVO code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupRef {
    pub group_uri: String,
    pub group_id: String,
}

/// The session currently attached to an account, with its group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSession {
    pub session_uri: String,
    pub session_id: String,
    pub group_uri: String,
    pub group_id: String,
}

impl CurrentSession {
    pub fn session(&self) -> SessionRef {
        SessionRef {
            session_uri: self.session_uri.clone(),
            session_id: self.session_id.clone(),
        }
    }

    pub fn group(&self) -> GroupRef {
        GroupRef {
            group_uri: self.group_uri.clone(),
            group_id: self.group_id.clone(),
        }
    }
}

//! acmidm-core: Shared types, vocabulary, and configuration for the login session store.
//!
//! This crate provides the foundational pieces used by the other workspace crates:
//! - Claims received from the identity provider
//! - Account, session, and group references resolved from the triple store
//! - RDF vocabulary constants for the mu/foaf/dcterms/besluit data model
//! - Store configuration and its loader
//! - Common error types

pub mod config;
pub mod error;
pub mod types;
pub mod vocab;

pub use config::StoreConfig;
pub use error::CoreError;
pub use types::{AccountRef, Claims, CurrentSession, GroupRef, ResourceId, SessionRef};

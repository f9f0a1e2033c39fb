//! acmidm-session: Account and session bookkeeping for the login flow.
//!
//! Resolves identity claims to a persisted person and account, creates and
//! removes session records, and looks up the Bestuurseenheid a user logs in
//! for. All state lives in the triple store behind a
//! [`GraphStore`](acmidm_graph::GraphStore).

pub mod config;
pub mod error;
pub mod store;

pub use error::{Result, SessionError};
pub use store::SessionStore;

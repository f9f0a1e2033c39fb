//! Error types for the acmidm-session crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Graph error: {0}")]
    Graph(#[from] acmidm_graph::GraphError),

    #[error("Config error: {0}")]
    Config(#[from] acmidm_core::CoreError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

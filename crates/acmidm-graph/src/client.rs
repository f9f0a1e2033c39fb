//! SPARQL endpoint connection and shared graph client.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};

use crate::mutations::Update;
use crate::queries::{parse_results_json, Select, Solution};
use crate::store::GraphStore;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("SPARQL endpoint request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SPARQL endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Missing binding for ?{var}")]
    MissingBinding { var: String },

    #[error("Unexpected term bound to ?{var}: expected {expected}")]
    UnexpectedTerm { var: String, expected: &'static str },
}

/// Configuration for connecting to a SPARQL endpoint.
#[derive(Debug, Clone)]
pub struct SparqlConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SparqlConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://database:8890/sparql".to_string(),
            timeout_secs: 60,
            user_agent: concat!("acmidm-graph/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP client for a SPARQL 1.1 Protocol endpoint.
///
/// Clone is cheap (inner Arc).
#[derive(Debug, Clone)]
pub struct SparqlClient {
    client: Client,
    endpoint: String,
}

impl SparqlClient {
    /// Build a client for the configured endpoint. No request is made.
    pub fn new(config: &SparqlConfig) -> Result<Self, GraphError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::info!(endpoint = %config.endpoint, "SPARQL client ready");
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute query text and collect all solutions.
    pub async fn query_text(&self, sparql: &str) -> Result<Vec<Solution>, GraphError> {
        tracing::debug!(query = %sparql, "SPARQL query");
        let resp = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", sparql)])
            .send()
            .await?;

        let body = check_status(resp).await?.text().await?;
        let solutions = parse_results_json(&body)?;
        tracing::debug!(rows = solutions.len(), "SPARQL query returned");
        Ok(solutions)
    }

    /// Execute update text.
    pub async fn update_text(&self, sparql: &str) -> Result<(), GraphError> {
        tracing::debug!(update = %sparql, "SPARQL update");
        let resp = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .form(&[("update", sparql)])
            .send()
            .await?;

        check_status(resp).await?;
        Ok(())
    }
}

impl GraphStore for SparqlClient {
    async fn select(&self, query: &Select) -> Result<Vec<Solution>, GraphError> {
        self.query_text(&query.to_sparql()).await
    }

    async fn update(&self, update: &Update) -> Result<(), GraphError> {
        self.update_text(&update.to_sparql()).await
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GraphError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!(%status, %content_type, "SPARQL endpoint rejected request");
    Err(GraphError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_mu_database() {
        let config = SparqlConfig::default();
        assert_eq!(config.endpoint, "http://database:8890/sparql");
        assert_eq!(config.timeout_secs, 60);
        assert!(config.user_agent.starts_with("acmidm-graph/"));
    }

    #[test]
    fn client_builds_without_contacting_endpoint() {
        let client = SparqlClient::new(&SparqlConfig {
            endpoint: "http://127.0.0.1:9/sparql".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/sparql");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_http_error() {
        let client = SparqlClient::new(&SparqlConfig {
            endpoint: "http://127.0.0.1:9/sparql".to_string(),
            timeout_secs: 2,
            ..Default::default()
        })
        .unwrap();
        let err = client
            .query_text("SELECT * WHERE { ?s ?p ?o } LIMIT 1")
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Http(_)));
    }
}

//! Configuration for the session store.
//!
//! Configuration is loaded from (in priority order):
//! 1. `MU_APPLICATION_GRAPH` for the graph name
//! 2. Environment variables (`ACMIDM_STORE__` prefix)
//! 3. Config file (`acmidm.toml`, `[store]` table)
//! 4. Defaults

use serde::Deserialize;

use crate::error::CoreError;

/// Where and how login resources are written in the triple store.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// Graph that scopes every query and update.
    #[serde(default = "default_graph")]
    pub graph: String,

    /// Value of `foaf:accountServiceHomepage` on created accounts.
    #[serde(default = "default_service_homepage")]
    pub service_homepage: String,

    #[serde(default = "default_person_base_uri")]
    pub person_base_uri: String,

    #[serde(default = "default_account_base_uri")]
    pub account_base_uri: String,

    #[serde(default = "default_identifier_base_uri")]
    pub identifier_base_uri: String,
}

const RESOURCE_BASE_URI: &str = "http://data.lblod.info/";

fn default_graph() -> String {
    "http://mu.semte.ch/application".to_string()
}

fn default_service_homepage() -> String {
    "https://github.com/lblod/acmidm-login-service".to_string()
}

fn default_person_base_uri() -> String {
    format!("{RESOURCE_BASE_URI}id/persoon/")
}

fn default_account_base_uri() -> String {
    format!("{RESOURCE_BASE_URI}id/account/")
}

fn default_identifier_base_uri() -> String {
    format!("{RESOURCE_BASE_URI}id/identificator/")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            graph: default_graph(),
            service_homepage: default_service_homepage(),
            person_base_uri: default_person_base_uri(),
            account_base_uri: default_account_base_uri(),
            identifier_base_uri: default_identifier_base_uri(),
        }
    }
}

impl StoreConfig {
    /// Load the `[store]` section from `<file_prefix>.toml` and the environment.
    pub fn load(file_prefix: &str) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("ACMIDM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("store.graph", std::env::var("MU_APPLICATION_GRAPH").ok())?
            .build()?;

        let store = match cfg.get::<StoreConfig>("store") {
            Ok(c) => c,
            Err(config::ConfigError::NotFound(_)) => StoreConfig::default(),
            Err(e) => return Err(e.into()),
        };
        store.validate()?;

        tracing::debug!(graph = %store.graph, "Loaded store configuration");
        Ok(store)
    }

    /// Reject configurations that would produce unusable resource URIs.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("graph", &self.graph),
            ("service_homepage", &self.service_homepage),
            ("person_base_uri", &self.person_base_uri),
            ("account_base_uri", &self.account_base_uri),
            ("identifier_base_uri", &self.identifier_base_uri),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidConfig(format!("store.{name} is empty")));
            }
        }
        Ok(())
    }
}

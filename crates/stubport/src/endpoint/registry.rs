//! EndpointRegistry - lifecycle management for a batch of endpoints.
//!
//! All records are validated before anything is bound: one invalid record
//! aborts the whole batch. Each endpoint then binds its own port.

use super::core::MockEndpoint;
use super::types::{ConfigurationError, EndpointError};
use crate::config::RuleConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Host endpoints bind to unless told otherwise
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{source} for server {name}")]
    InvalidRule {
        index: usize,
        name: String,
        #[source]
        source: ConfigurationError,
    },
    #[error("Port {port} is used by more than one server ({first} and {second})")]
    PortInUse {
        port: u16,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Owns the endpoints started from one configuration, in configuration order
pub struct EndpointRegistry {
    endpoints: Vec<Arc<MockEndpoint>>,
}

impl EndpointRegistry {
    /// Validate every record, then start one endpoint per record on
    /// `DEFAULT_HOST`.
    pub async fn start(configs: &[RuleConfig]) -> Result<Self, RegistryError> {
        Self::start_on(configs, DEFAULT_HOST).await
    }

    /// Validate every record, then start one endpoint per record on `host`.
    ///
    /// If any endpoint fails to bind, the ones already started are closed
    /// before the error is returned.
    pub async fn start_on(configs: &[RuleConfig], host: &str) -> Result<Self, RegistryError> {
        info!("Starting {} endpoint(s)", configs.len());
        let endpoints = Self::validate_all(configs)?;

        let mut registry = Self {
            endpoints: Vec::with_capacity(endpoints.len()),
        };
        for endpoint in endpoints {
            let endpoint = Arc::new(endpoint);
            if let Err(e) = endpoint.bind(host).await {
                error!("{}", e);
                registry.stop_all();
                return Err(e.into());
            }
            registry.endpoints.push(endpoint);
        }
        Ok(registry)
    }

    fn validate_all(configs: &[RuleConfig]) -> Result<Vec<MockEndpoint>, RegistryError> {
        let mut ports: HashMap<u16, String> = HashMap::new();
        let mut endpoints = Vec::with_capacity(configs.len());

        for (index, config) in configs.iter().enumerate() {
            let endpoint = MockEndpoint::new(config).map_err(|source| {
                RegistryError::InvalidRule {
                    index,
                    name: config
                        .name
                        .clone()
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| "default".to_string()),
                    source,
                }
            })?;

            let rule = endpoint.rule();
            if let Some(first) = ports.get(&rule.port) {
                return Err(RegistryError::PortInUse {
                    port: rule.port,
                    first: first.clone(),
                    second: rule.display_name().to_string(),
                });
            }
            ports.insert(rule.port, rule.display_name().to_string());
            endpoints.push(endpoint);
        }
        Ok(endpoints)
    }

    /// Endpoints in configuration order
    pub fn endpoints(&self) -> &[Arc<MockEndpoint>] {
        &self.endpoints
    }

    /// First endpoint whose rule carries `name`
    pub fn get(&self, name: &str) -> Option<&Arc<MockEndpoint>> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.rule().name.as_deref() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Close every endpoint. Already closed endpoints are skipped; returns how
    /// many were closed by this call.
    pub fn stop_all(&self) -> usize {
        let closed = self
            .endpoints
            .iter()
            .filter(|endpoint| endpoint.close())
            .count();
        if closed > 0 {
            info!("Stopped {} endpoint(s)", closed);
        }
        closed
    }
}

// Library exports for the binary, integration tests and benchmarks

pub mod config;
pub mod endpoint;
pub mod predicate;
pub mod summary;

pub use config::{load_config, RuleConfig};
pub use endpoint::{EndpointRegistry, MockEndpoint, RegistryError};

//! Configuration-driven stub endpoints.
//!
//! This module provides:
//! - `EndpointRegistry`: Lifecycle management for a batch of endpoints
//! - `MockEndpoint`: One endpoint with its own port, rule and state
//! - `Rule`: A validated configuration record
//!
//! Each endpoint binds to its own TCP port and answers every request with
//! either its configured output or its configured error.
//!
//! ## Module Structure
//!
//! - `types`: All type definitions (rule, descriptors, errors)
//! - `validate`: Configuration record checks and normalization
//! - `payload`: Merging body and query into one comparable payload
//! - `resolve`: The response decision table
//! - `handler`: HTTP request handling for endpoints
//! - `registry`: EndpointRegistry for lifecycle management
//! - `core`: Core MockEndpoint struct and implementation

mod core;
mod handler;
mod payload;
mod registry;
mod resolve;
mod types;
mod validate;


pub use types::{
    parse_body, ConfigurationError, EndpointError, EndpointState, HttpMethod, MatchOutcome,
    PayloadParseError, RequestDescriptor, ResponseDirective, Rule,
};

pub use core::MockEndpoint;

pub use registry::{EndpointRegistry, RegistryError, DEFAULT_HOST};

pub use handler::{handle_endpoint_request, text_response, ENDPOINT_HEADER};
pub use payload::Payload;
pub use resolve::{
    error_directive, resolve, Evaluation, DEFAULT_ERROR_CODE, DEFAULT_ERROR_MESSAGE,
    DEFAULT_SUCCESS_CODE,
};
pub use validate::{validate_rule, DEFAULT_PATH};

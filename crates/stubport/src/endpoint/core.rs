//! Core MockEndpoint struct and implementation.
//!
//! A MockEndpoint owns one validated rule and answers request descriptors for
//! it. Lifecycle: `Validated` after construction, `Serving` once a listener is
//! attached, `Closed` after `close`.

use super::handler::handle_endpoint_request;
use super::payload::Payload;
use super::resolve::{resolve, Evaluation};
use super::types::{
    ConfigurationError, EndpointError, EndpointState, MatchOutcome, RequestDescriptor,
    ResponseDirective, Rule,
};
use crate::config::RuleConfig;
use crate::predicate::compare;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Runtime state of one stub endpoint
pub struct MockEndpoint {
    rule: Rule,
    state: RwLock<EndpointState>,
    /// Address of the attached listener, once serving
    local_addr: RwLock<Option<SocketAddr>>,
    /// Stops the accept loop
    shutdown_tx: Mutex<Option<broadcast::Sender<()>>>,
    request_count: AtomicU64,
}

impl MockEndpoint {
    /// Validate a configuration record and build an endpoint from it.
    pub fn new(config: &RuleConfig) -> Result<Self, ConfigurationError> {
        let rule = Rule::try_from(config)?;
        Ok(Self::from_rule(rule))
    }

    /// Build an endpoint from an already validated rule.
    pub fn from_rule(rule: Rule) -> Self {
        Self {
            rule,
            state: RwLock::new(EndpointState::Validated),
            local_addr: RwLock::new(None),
            shutdown_tx: Mutex::new(None),
            request_count: AtomicU64::new(0),
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn state(&self) -> EndpointState {
        *self.state.read()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.read()
    }

    /// Requests answered while serving
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Compute the answer for a request. Pure: depends only on the rule and
    /// the request, and does not look at the lifecycle state.
    pub fn evaluate(&self, request: &RequestDescriptor) -> ResponseDirective {
        let rule = &self.rule;
        if !rule.route_matches(&request.method, &request.path) {
            debug!(
                "Route mismatch on port {}: {} {} (expected {} {})",
                rule.port,
                request.method,
                request.path,
                rule.methods_label(),
                rule.path
            );
            return resolve(rule, &Evaluation::route_mismatch());
        }

        let payload = Payload::from_request(request);
        let has_payload = !payload.is_empty();
        debug!("Requested payload: {}", payload.to_json());

        let outcome = match &rule.expected_input {
            Some(expected) if has_payload => MatchOutcome::from(compare(expected, payload.root())),
            _ => MatchOutcome::NotMatched,
        };

        resolve(
            rule,
            &Evaluation {
                route_matched: true,
                outcome,
                has_payload,
            },
        )
    }

    /// Answer a request while serving.
    pub fn handle(&self, request: &RequestDescriptor) -> Result<ResponseDirective, EndpointError> {
        let state = self.state();
        if state != EndpointState::Serving {
            return Err(EndpointError::NotServing {
                port: self.rule.port,
                state,
            });
        }
        self.request_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.evaluate(request))
    }

    /// Bind the rule's port on `host` and start serving.
    pub async fn bind(self: &Arc<Self>, host: &str) -> Result<SocketAddr, EndpointError> {
        let port = self.rule.port;
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| EndpointError::BindError(port, e.to_string()))?;
        self.listen(listener)
    }

    /// Start serving on an already bound listener.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen(self: &Arc<Self>, listener: TcpListener) -> Result<SocketAddr, EndpointError> {
        let port = self.rule.port;
        let addr = listener
            .local_addr()
            .map_err(|e| EndpointError::BindError(port, e.to_string()))?;

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        {
            let mut state = self.state.write();
            if *state != EndpointState::Validated {
                return Err(EndpointError::AlreadyStarted {
                    port,
                    state: *state,
                });
            }
            *state = EndpointState::Serving;
            *self.shutdown_tx.lock() = Some(shutdown_tx);
            *self.local_addr.write() = Some(addr);
        }

        info!(
            "Endpoint '{}' listening on {} ({} {})",
            self.rule.display_name(),
            addr,
            self.rule.methods_label(),
            self.rule.path
        );

        let endpoint = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, client_addr)) => {
                                let endpoint = Arc::clone(&endpoint);
                                tokio::spawn(async move {
                                    let io = TokioIo::new(stream);
                                    let service = service_fn(move |req| {
                                        let endpoint = Arc::clone(&endpoint);
                                        async move {
                                            handle_endpoint_request(req, endpoint, client_addr).await
                                        }
                                    });
                                    if let Err(e) = http1::Builder::new()
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        debug!("Connection error on {}: {}", addr, e);
                                    }
                                });
                            }
                            Err(e) => {
                                error!("Accept error on {}: {}", addr, e);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Accept loop on {} stopped", addr);
                        break;
                    }
                }
            }
        });

        Ok(addr)
    }

    /// Stop accepting requests. Closing an already closed endpoint does
    /// nothing; the return value tells whether this call closed it.
    pub fn close(&self) -> bool {
        {
            let mut state = self.state.write();
            if *state == EndpointState::Closed {
                return false;
            }
            *state = EndpointState::Closed;
        }

        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }

        info!(
            "Endpoint closed: port {} path {} methods {}",
            self.rule.port,
            self.rule.path,
            self.rule.methods_label()
        );
        true
    }
}

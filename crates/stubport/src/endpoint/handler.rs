//! HTTP request handling for endpoints.
//!
//! Collects the request into a `RequestDescriptor`, lets the endpoint resolve
//! it, and writes the directive back as `text/plain`.

use super::core::MockEndpoint;
use super::types::{parse_body, RequestDescriptor, ResponseDirective};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use hyper::header::CONTENT_TYPE;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Header naming the endpoint that produced a response
pub const ENDPOINT_HEADER: &str = "x-stubport-endpoint";

/// Handle a request to an endpoint
pub async fn handle_endpoint_request<B>(
    req: Request<B>,
    endpoint: Arc<MockEndpoint>,
    client_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().to_string();
    let uri = req.uri().clone();
    info!("Request received: {} {} from {}", method, uri, client_addr);

    let body = match req.into_body().collect().await {
        Ok(collected) => match parse_body(&collected.to_bytes()) {
            Ok(body) => body,
            Err(e) => {
                warn!("{} {}: {}", method, uri, e);
                None
            }
        },
        Err(e) => {
            warn!("Failed to read request body for {} {}: {}", method, uri, e);
            None
        }
    };

    let descriptor = RequestDescriptor::new(method, uri.path(), body, uri.query());
    let name = endpoint.rule().display_name();

    match endpoint.handle(&descriptor) {
        Ok(directive) => {
            if (200..300).contains(&directive.status_code) {
                info!("Output: {} {}", directive.status_code, directive.body);
            } else {
                warn!("Error message: {} {}", directive.status_code, directive.body);
            }
            Ok(text_response(&directive, name))
        }
        Err(e) => {
            warn!("{}", e);
            let unavailable = ResponseDirective::new(
                StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                "Service Unavailable",
            );
            Ok(text_response(&unavailable, name))
        }
    }
}

/// Write a directive as a `text/plain` response.
///
/// A status code hyper cannot represent is logged and answered with 500.
pub fn text_response(directive: &ResponseDirective, endpoint_name: &str) -> Response<Full<Bytes>> {
    let status = match StatusCode::from_u16(directive.status_code) {
        Ok(status) => status,
        Err(_) => {
            error!(
                "Configured status code {} is not a valid HTTP status",
                directive.status_code
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .header(ENDPOINT_HEADER, endpoint_name)
        .body(Full::new(Bytes::from(directive.body.clone())))
        .unwrap_or_else(|_| {
            // Only reachable with an endpoint name that is not a valid header value
            let mut response = Response::new(Full::new(Bytes::from(directive.body.clone())));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static("text/plain"));
            response
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::endpoint::EndpointState;
    use serde_json::json;

    fn client() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn serving_endpoint() -> Arc<MockEndpoint> {
        let endpoint = MockEndpoint::new(&RuleConfig {
            name: Some("text".to_string()),
            port: Some(3000),
            methods: Some("POST".into()),
            input: Some(json!({"type": "text"})),
            output: Some("text".to_string()),
            ..Default::default()
        })
        .unwrap();
        Arc::new(endpoint)
    }

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_text_response_headers() {
        let response = text_response(&ResponseDirective::new(201, "created"), "orders");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[ENDPOINT_HEADER], "orders");
    }

    #[test]
    fn test_text_response_invalid_status() {
        let response = text_response(&ResponseDirective::new(1000, "odd"), "default");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_request_before_serving_is_unavailable() {
        let endpoint = serving_endpoint();
        assert_eq!(endpoint.state(), EndpointState::Validated);

        let req = Request::post("/")
            .body(Full::new(Bytes::from(r#"{"type":"text"}"#)))
            .unwrap();
        let response = handle_endpoint_request(req, endpoint, client()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_malformed_body_is_treated_as_no_payload() {
        let endpoint = serving_endpoint();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        endpoint.listen(listener).unwrap();

        let req = Request::post("/")
            .body(Full::new(Bytes::from("{not json")))
            .unwrap();
        let response = handle_endpoint_request(req, Arc::clone(&endpoint), client())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Not Found");

        // Still serving afterwards
        let req = Request::post("/")
            .body(Full::new(Bytes::from(r#"{"type":"text"}"#)))
            .unwrap();
        let response = handle_endpoint_request(req, Arc::clone(&endpoint), client())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "text");
        assert_eq!(endpoint.request_count(), 2);

        endpoint.close();
    }
}

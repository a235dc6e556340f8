//! Comparison payload built from a request's body and query string.

use super::types::RequestDescriptor;
use crate::predicate::{JsonNode, NodeId, NodeRef, Shape, ValueGraph};
use serde_json::Value;

/// The merged body and query of one request.
///
/// Without query parameters the payload is the body itself (an empty object
/// when there is no body). With query parameters it is a new object holding the
/// body's fields overlaid with the query parameters, so a query key wins over a
/// body key of the same name. A body that is not an object has no fields to
/// contribute to that merge.
pub struct Payload {
    graph: ValueGraph,
    root: NodeId,
}

impl Payload {
    pub fn from_request(request: &RequestDescriptor) -> Self {
        let mut graph = ValueGraph::new();
        let body = request.body.as_ref().filter(|body| !body.is_null());

        if request.query.is_empty() {
            let root = match body {
                Some(body) => graph.insert_value(body),
                None => graph.object(),
            };
            return Self { graph, root };
        }

        let root = graph.object();
        if let Some(Value::Object(fields)) = body {
            for (key, value) in fields {
                let child = graph.insert_value(value);
                graph.set_field(root, key.as_str(), child);
            }
        }
        for (key, value) in &request.query {
            let child = match value {
                Some(value) => graph.string(value.as_str()),
                None => graph.missing(),
            };
            graph.set_field(root, key.as_str(), child);
        }
        Self { graph, root }
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.graph.node(self.root)
    }

    /// Whether there is nothing to compare: the merged payload is an object
    /// without fields or an array without items.
    pub fn is_empty(&self) -> bool {
        match self.root().shape() {
            Shape::Object(fields) => fields.is_empty(),
            Shape::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// JSON rendering for logs.
    pub fn to_json(&self) -> Value {
        self.graph.to_json(self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::compare;
    use serde_json::json;

    #[test]
    fn test_body_only() {
        let request = RequestDescriptor::new("POST", "/", Some(json!({"type": "text"})), None);
        let payload = Payload::from_request(&request);
        assert_eq!(payload.to_json(), json!({"type": "text"}));
    }

    #[test]
    fn test_no_body_no_query_is_empty_object() {
        let request = RequestDescriptor::new("GET", "/", None, None);
        assert_eq!(Payload::from_request(&request).to_json(), json!({}));

        let null_body = RequestDescriptor::new("GET", "/", Some(Value::Null), None);
        assert_eq!(Payload::from_request(&null_body).to_json(), json!({}));
    }

    #[test]
    fn test_non_object_body_without_query_is_kept() {
        let request = RequestDescriptor::new("POST", "/", Some(json!([1, 2])), None);
        let payload = Payload::from_request(&request);
        assert!(compare(&json!([1, 2]), payload.root()));
    }

    #[test]
    fn test_query_overrides_body() {
        let request = RequestDescriptor::new(
            "POST",
            "/",
            Some(json!({"type": "body", "keep": 1})),
            Some("type=query&extra=x"),
        );
        let payload = Payload::from_request(&request);
        assert_eq!(
            payload.to_json(),
            json!({"type": "query", "keep": 1, "extra": "x"})
        );
    }

    #[test]
    fn test_query_values_are_strings() {
        let request = RequestDescriptor::from_target("GET", "/x?count=3", None);
        let payload = Payload::from_request(&request);
        assert!(compare(&json!({"count": "3"}), payload.root()));
        assert!(!compare(&json!({"count": 3}), payload.root()));
    }

    #[test]
    fn test_query_key_without_value_shadows_body_key() {
        let request = RequestDescriptor::new("POST", "/", Some(json!({"flag": true})), Some("flag"));
        let payload = Payload::from_request(&request);
        assert!(!compare(&json!({"flag": true}), payload.root()));
        assert_eq!(payload.to_json(), json!({"flag": null}));
    }

    #[test]
    fn test_is_empty() {
        let empty = [
            RequestDescriptor::new("POST", "/", None, None),
            RequestDescriptor::new("POST", "/", Some(Value::Null), None),
            RequestDescriptor::new("POST", "/", Some(json!({})), None),
            RequestDescriptor::new("POST", "/", Some(json!([])), None),
            RequestDescriptor::new("POST", "/", Some(json!({})), Some("")),
        ];
        for request in &empty {
            assert!(Payload::from_request(request).is_empty(), "{:?}", request);
        }

        let present = [
            RequestDescriptor::new("POST", "/", Some(json!({"a": 1})), None),
            RequestDescriptor::new("POST", "/", Some(json!(0)), None),
            RequestDescriptor::new("POST", "/", Some(json!("")), None),
            RequestDescriptor::new("POST", "/", Some(json!("raw")), Some("flag")),
            RequestDescriptor::from_target("GET", "/x?a=b", None),
        ];
        for request in &present {
            assert!(!Payload::from_request(request).is_empty(), "{:?}", request);
        }
    }

    #[test]
    fn test_non_object_body_with_query_contributes_nothing() {
        let request = RequestDescriptor::new("POST", "/", Some(json!("raw")), Some("a=1"));
        assert_eq!(Payload::from_request(&request).to_json(), json!({"a": "1"}));
    }
}

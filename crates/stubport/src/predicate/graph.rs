//! Arena-backed JSON-like values.
//!
//! `serde_json::Value` is a tree, so it can neither share a child between two
//! parents nor point back at an ancestor. `ValueGraph` stores nodes in an arena
//! and links them by `NodeId`, which allows both. Request payloads are built as
//! graphs because they also need a value `serde_json` has no room for: a key
//! that was named without a value.

use super::structural::{JsonNode, NodeIdentity, Shape};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Index of a node inside its `ValueGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum GraphNode {
    Missing,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<NodeId>),
    Object(BTreeMap<String, NodeId>),
}

/// An arena of JSON-like nodes that may reference each other.
#[derive(Debug, Clone, Default)]
pub struct ValueGraph {
    nodes: Vec<GraphNode>,
}

impl ValueGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, node: GraphNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Number of nodes stored in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add an empty object node.
    pub fn object(&mut self) -> NodeId {
        self.push_node(GraphNode::Object(BTreeMap::new()))
    }

    /// Add an empty array node.
    pub fn array(&mut self) -> NodeId {
        self.push_node(GraphNode::Array(Vec::new()))
    }

    /// Add a string node.
    pub fn string(&mut self, value: impl Into<String>) -> NodeId {
        self.push_node(GraphNode::String(value.into()))
    }

    /// Add a node that stands for a named key without a value.
    pub fn missing(&mut self) -> NodeId {
        self.push_node(GraphNode::Missing)
    }

    /// Deep-copy a `serde_json::Value` into the arena and return its root.
    pub fn insert_value(&mut self, value: &Value) -> NodeId {
        match value {
            Value::Null => self.push_node(GraphNode::Null),
            Value::Bool(b) => self.push_node(GraphNode::Bool(*b)),
            Value::Number(n) => self.push_node(GraphNode::Number(n.clone())),
            Value::String(s) => self.push_node(GraphNode::String(s.clone())),
            Value::Array(items) => {
                let children = items.iter().map(|item| self.insert_value(item)).collect();
                self.push_node(GraphNode::Array(children))
            }
            Value::Object(map) => {
                let fields = map
                    .iter()
                    .map(|(key, item)| (key.clone(), self.insert_value(item)))
                    .collect();
                self.push_node(GraphNode::Object(fields))
            }
        }
    }

    /// Set `key` on an object node, replacing any previous value of that key.
    ///
    /// Returns `false` (and changes nothing) when `object` is not an object.
    pub fn set_field(&mut self, object: NodeId, key: impl Into<String>, child: NodeId) -> bool {
        match self.nodes.get_mut(object.0) {
            Some(GraphNode::Object(fields)) => {
                fields.insert(key.into(), child);
                true
            }
            _ => false,
        }
    }

    /// Append `child` to an array node.
    ///
    /// Returns `false` (and changes nothing) when `array` is not an array.
    pub fn push(&mut self, array: NodeId, child: NodeId) -> bool {
        match self.nodes.get_mut(array.0) {
            Some(GraphNode::Array(items)) => {
                items.push(child);
                true
            }
            _ => false,
        }
    }

    /// Borrow a node for comparison.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { graph: self, id }
    }

    /// Render a node as JSON for logging.
    ///
    /// Missing values render as `null`; a back-reference to a node that is
    /// already being rendered renders as the string `"[Circular]"`.
    pub fn to_json(&self, id: NodeId) -> Value {
        let mut stack = Vec::new();
        self.render(id, &mut stack)
    }

    fn render(&self, id: NodeId, stack: &mut Vec<NodeId>) -> Value {
        if stack.contains(&id) {
            return Value::String("[Circular]".to_string());
        }
        let Some(node) = self.nodes.get(id.0) else {
            return Value::Null;
        };
        match node {
            GraphNode::Missing | GraphNode::Null => Value::Null,
            GraphNode::Bool(b) => Value::Bool(*b),
            GraphNode::Number(n) => Value::Number(n.clone()),
            GraphNode::String(s) => Value::String(s.clone()),
            GraphNode::Array(items) => {
                stack.push(id);
                let rendered = items.iter().map(|item| self.render(*item, stack)).collect();
                stack.pop();
                Value::Array(rendered)
            }
            GraphNode::Object(fields) => {
                stack.push(id);
                let rendered = fields
                    .iter()
                    .map(|(key, item)| (key.clone(), self.render(*item, stack)))
                    .collect();
                stack.pop();
                Value::Object(rendered)
            }
        }
    }
}

/// A node borrowed from a `ValueGraph`.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'g> {
    graph: &'g ValueGraph,
    id: NodeId,
}

impl<'g> NodeRef<'g> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl<'g> JsonNode<'g> for NodeRef<'g> {
    fn identity(self) -> NodeIdentity {
        (self.graph as *const ValueGraph as usize, self.id.0)
    }

    fn shape(self) -> Shape<'g, Self> {
        let graph = self.graph;
        let Some(node) = graph.nodes.get(self.id.0) else {
            return Shape::Missing;
        };
        match node {
            GraphNode::Missing => Shape::Missing,
            GraphNode::Null => Shape::Null,
            GraphNode::Bool(b) => Shape::Bool(*b),
            GraphNode::Number(n) => Shape::Number(n),
            GraphNode::String(s) => Shape::String(s.as_str()),
            GraphNode::Array(items) => {
                Shape::Array(items.iter().map(|id| graph.node(*id)).collect())
            }
            GraphNode::Object(fields) => Shape::Object(
                fields
                    .iter()
                    .map(|(key, id)| (key.as_str(), graph.node(*id)))
                    .collect(),
            ),
        }
    }

    fn field(self, key: &str) -> Option<Self> {
        match self.graph.nodes.get(self.id.0)? {
            GraphNode::Object(fields) => fields.get(key).map(|id| self.graph.node(*id)),
            _ => None,
        }
    }
}

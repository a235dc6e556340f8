//! Structural equality between JSON-like values.
//!
//! The comparison is asymmetric for objects: every key of the expected object
//! must be present in the actual object with an equal value, while keys that
//! only the actual object carries are ignored. Arrays must have the same length
//! and match index by index.
//!
//! Cycles are handled by recording the identity of every object/array node the
//! comparison descends into. When a pair is reached whose two sides have both
//! been recorded already, the pair counts as equal and the comparison does not
//! descend again. Recorded identities stay recorded for the rest of the call, so
//! shared substructure is only walked once.

use serde_json::{Number, Value};
use std::collections::HashSet;

/// Identity of a node for cycle detection: owning container address and slot.
pub type NodeIdentity = (usize, usize);

/// Borrowed view of a single node.
#[derive(Debug)]
pub enum Shape<'a, N> {
    /// A value that was named but never given one (e.g. `?flag` in a query).
    /// It only equals another missing value.
    Missing,
    Null,
    Bool(bool),
    Number(&'a Number),
    String(&'a str),
    Array(Vec<N>),
    Object(Vec<(&'a str, N)>),
}

/// A JSON-like node that can be compared structurally.
pub trait JsonNode<'a>: Copy {
    /// Stable identity of this node for the duration of a comparison.
    fn identity(self) -> NodeIdentity;

    /// The kind of this node together with its direct children.
    fn shape(self) -> Shape<'a, Self>;

    /// Look up a field when this node is an object.
    fn field(self, key: &str) -> Option<Self>;
}

impl<'a> JsonNode<'a> for &'a Value {
    fn identity(self) -> NodeIdentity {
        (self as *const Value as usize, 0)
    }

    fn shape(self) -> Shape<'a, Self> {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Bool(*b),
            Value::Number(n) => Shape::Number(n),
            Value::String(s) => Shape::String(s.as_str()),
            Value::Array(items) => Shape::Array(items.iter().collect()),
            Value::Object(map) => {
                Shape::Object(map.iter().map(|(k, v)| (k.as_str(), v)).collect())
            }
        }
    }

    fn field(self, key: &str) -> Option<Self> {
        self.as_object()?.get(key)
    }
}

/// Identities of the object/array nodes entered so far in one comparison.
#[derive(Default)]
struct Visited {
    seen: HashSet<NodeIdentity>,
}

impl Visited {
    /// Record both sides of a pair. Returns `false` when both were already
    /// recorded, meaning the pair is being revisited.
    fn enter(&mut self, expected: NodeIdentity, actual: NodeIdentity) -> bool {
        let revisited = self.seen.contains(&expected) && self.seen.contains(&actual);
        self.seen.insert(expected);
        self.seen.insert(actual);
        !revisited
    }
}

/// Check whether `actual` structurally contains `expected`.
///
/// Never fails: values of unexpected shape simply compare unequal. The visited
/// set lives only for this call.
pub fn compare<'e, 'a, E, A>(expected: E, actual: A) -> bool
where
    E: JsonNode<'e>,
    A: JsonNode<'a>,
{
    let mut visited = Visited::default();
    compare_nodes(expected, actual, &mut visited)
}

fn compare_nodes<'e, 'a, E, A>(expected: E, actual: A, visited: &mut Visited) -> bool
where
    E: JsonNode<'e>,
    A: JsonNode<'a>,
{
    match (expected.shape(), actual.shape()) {
        (Shape::Array(expected_items), Shape::Array(actual_items)) => {
            if expected_items.len() != actual_items.len() {
                return false;
            }
            if !visited.enter(expected.identity(), actual.identity()) {
                return true;
            }
            expected_items
                .into_iter()
                .zip(actual_items)
                .all(|(e, a)| compare_nodes(e, a, visited))
        }
        (Shape::Object(expected_fields), Shape::Object(_)) => {
            if !visited.enter(expected.identity(), actual.identity()) {
                return true;
            }
            expected_fields.into_iter().all(|(key, e)| {
                actual
                    .field(key)
                    .is_some_and(|a| compare_nodes(e, a, visited))
            })
        }
        (Shape::Missing, Shape::Missing) | (Shape::Null, Shape::Null) => true,
        (Shape::Bool(a), Shape::Bool(b)) => a == b,
        (Shape::Number(a), Shape::Number(b)) => numbers_equal(a, b),
        (Shape::String(a), Shape::String(b)) => a == b,
        _ => false,
    }
}

/// Numeric equality independent of representation (`1` equals `1.0`).
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a == b {
        return true;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

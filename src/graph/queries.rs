use serde_json::Value;

/// Something a structural query can be evaluated against.
///
/// Plain JSON implements this directly. The resolution layer implements it for
/// resolved nodes and links so that a query can follow references from a node
/// to its links and on to their endpoint nodes.
pub trait Candidate: Sized {
    /// The value stored under `key`, if any.
    fn field(&self, key: &str) -> Option<Self>;

    /// The element at position `index`, if any.
    fn element(&self, index: usize) -> Option<Self>;

    /// The candidate as a scalar JSON value, or `None` for containers and
    /// references.
    fn scalar(&self) -> Option<&Value>;
}

/// Returns `true` if `candidate` satisfies every field specified in `query`.
///
/// Objects in the query are matched field by field and arrays position by
/// position: query element `i` is tested against candidate element `i` only,
/// never against "any" element. Scalars require strict equality. An empty
/// query matches everything, and a field missing on the candidate fails.
///
/// Only the part of the candidate addressed by the query is visited, so a
/// finite query terminates even when the candidate graph is cyclic.
pub fn matches<C: Candidate>(candidate: &C, query: &Value) -> bool {
    match query {
        Value::Object(fields) => fields.iter().all(|(key, expected)| {
            candidate
                .field(key)
                .is_some_and(|actual| matches(&actual, expected))
        }),
        Value::Array(elements) => elements.iter().enumerate().all(|(i, expected)| {
            candidate
                .element(i)
                .is_some_and(|actual| matches(&actual, expected))
        }),
        expected => candidate
            .scalar()
            .is_some_and(|actual| strict_eq(actual, expected)),
    }
}

/// Scalar equality with numbers compared by value, so `1` equals `1.0`.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => false,
        _ => a == b,
    }
}

impl<'a> Candidate for &'a Value {
    fn field(&self, key: &str) -> Option<Self> {
        match *self {
            Value::Object(fields) => fields.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    fn element(&self, index: usize) -> Option<Self> {
        match *self {
            Value::Array(items) => items.get(index),
            Value::Object(fields) => fields.get(&index.to_string()),
            _ => None,
        }
    }

    fn scalar(&self) -> Option<&Value> {
        match *self {
            Value::Object(_) | Value::Array(_) => None,
            scalar => Some(scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(candidate: Value, query: Value) -> bool {
        matches(&&candidate, &query)
    }

    #[test]
    fn empty_query_matches_anything() {
        assert!(check(json!({"a": 1}), json!({})));
        assert!(check(json!(null), json!({})));
        assert!(check(json!([1, 2]), json!([])));
    }

    #[test]
    fn partial_object_match() {
        let candidate = json!({"id": "1", "data": {"name": "Tommy", "age": 31}});
        assert!(check(candidate.clone(), json!({"data": {"name": "Tommy"}})));
        assert!(!check(candidate.clone(), json!({"data": {"name": "Viktoria"}})));
        assert!(!check(candidate, json!({"data": {"nickname": "Tom"}})));
    }

    #[test]
    fn missing_field_fails_even_for_null_query() {
        assert!(!check(json!({"a": 1}), json!({"b": null})));
        assert!(check(json!({"b": null}), json!({"b": null})));
    }

    #[test]
    fn arrays_match_positionally() {
        let candidate = json!({"tags": ["red", "green", "blue"]});
        assert!(check(candidate.clone(), json!({"tags": ["red"]})));
        assert!(check(candidate.clone(), json!({"tags": ["red", "green"]})));
        assert!(!check(candidate.clone(), json!({"tags": ["green"]})));
        assert!(!check(candidate, json!({"tags": ["red", "green", "blue", "black"]})));
    }

    #[test]
    fn container_never_equals_scalar() {
        assert!(!check(json!({"a": {"b": 1}}), json!({"a": 1})));
        assert!(!check(json!({"a": [1]}), json!({"a": "1"})));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(check(json!({"n": 1}), json!({"n": 1.0})));
        assert!(!check(json!({"n": 1}), json!({"n": "1"})));
        assert!(!check(json!({"flag": true}), json!({"flag": 1})));
    }

    #[test]
    fn object_query_addresses_array_indices() {
        assert!(check(json!({"list": ["a", "b"]}), json!({"list": {"1": "b"}})));
        assert!(!check(json!({"list": ["a", "b"]}), json!({"list": {"x": "b"}})));
    }
}

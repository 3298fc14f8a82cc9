use serde_json::{Map, Value};

/// Deep-merges `source` into `target` in place.
///
/// Scalars (including `null`) in `source` overwrite the field in `target`.
/// Objects and arrays are merged recursively, creating an empty container in
/// `target` first when the field is absent. Arrays overlay element by element
/// rather than being replaced or concatenated, so `[1, 2]` merged with `[9]`
/// becomes `[9, 2]`.
pub fn merge_fields(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        if is_container(value) {
            let slot = target
                .entry(key.clone())
                .or_insert_with(|| empty_like(value));
            merge_value(slot, value);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Deep-merges a single value. See [`merge_fields`].
///
/// When the container kinds disagree, an object `source` turns an array
/// `target` into an object keyed by element index, and an array `source` is
/// overlaid onto an object `target` using the index strings as keys. A scalar
/// `target` is replaced by an empty container before merging.
pub fn merge_value(target: &mut Value, source: &Value) {
    match source {
        Value::Object(fields) => {
            if let Value::Array(items) = target {
                *target = Value::Object(index_keyed(std::mem::take(items)));
            } else if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(existing) = target {
                merge_fields(existing, fields);
            }
        }
        Value::Array(elements) => match target {
            Value::Array(items) => merge_elements(items, elements),
            Value::Object(existing) => {
                let keyed = index_keyed(elements.clone());
                merge_fields(existing, &keyed);
            }
            _ => {
                let mut items = Vec::with_capacity(elements.len());
                merge_elements(&mut items, elements);
                *target = Value::Array(items);
            }
        },
        scalar => *target = scalar.clone(),
    }
}

fn merge_elements(items: &mut Vec<Value>, elements: &[Value]) {
    for (i, value) in elements.iter().enumerate() {
        if i == items.len() {
            items.push(if is_container(value) {
                empty_like(value)
            } else {
                Value::Null
            });
        }
        if is_container(value) {
            merge_value(&mut items[i], value);
        } else {
            items[i] = value.clone();
        }
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn empty_like(value: &Value) -> Value {
    match value {
        Value::Array(_) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}

fn index_keyed(items: Vec<Value>) -> Map<String, Value> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn merged(target: Value, source: Value) -> Value {
        let mut target = target;
        merge_value(&mut target, &source);
        target
    }

    #[test]
    fn keeps_untouched_fields() {
        let out = merged(json!({"x": 1, "nested": {"a": 1}}), json!({"y": 2, "nested": {"b": 2}}));
        assert_eq!(out, json!({"x": 1, "y": 2, "nested": {"a": 1, "b": 2}}));
    }

    #[test]
    fn incoming_scalar_wins() {
        let out = merged(json!({"x": 1, "nested": {"a": 1}}), json!({"x": "one", "nested": null}));
        assert_eq!(out, json!({"x": "one", "nested": null}));
    }

    #[test]
    fn creates_missing_containers() {
        let out = merged(json!({}), json!({"a": {"b": {"c": true}}, "list": [{"k": 1}]}));
        assert_eq!(out, json!({"a": {"b": {"c": true}}, "list": [{"k": 1}]}));
    }

    #[test]
    fn arrays_overlay_by_index() {
        let out = merged(json!({"tags": [1, 2, 3]}), json!({"tags": [9]}));
        assert_eq!(out, json!({"tags": [9, 2, 3]}));

        let out = merged(json!({"tags": [{"a": 1}]}), json!({"tags": [{"b": 2}, {"c": 3}]}));
        assert_eq!(out, json!({"tags": [{"a": 1, "b": 2}, {"c": 3}]}));
    }

    #[test]
    fn scalar_target_becomes_container() {
        let out = merged(json!({"a": 5}), json!({"a": {"b": 1}}));
        assert_eq!(out, json!({"a": {"b": 1}}));
    }

    #[test]
    fn mismatched_containers_use_index_keys() {
        let out = merged(json!({"a": {"x": 1}}), json!({"a": ["zero"]}));
        assert_eq!(out, json!({"a": {"x": 1, "0": "zero"}}));

        let out = merged(json!({"a": ["zero", "one"]}), json!({"a": {"1": "uno"}}));
        assert_eq!(out, json!({"a": {"0": "zero", "1": "uno"}}));
    }

    #[test]
    fn empty_source_is_noop() {
        let mut target = json!({"a": 1}).as_object().cloned().unwrap();
        merge_fields(&mut target, &Map::new());
        assert_eq!(Value::Object(target), json!({"a": 1}));
    }
}

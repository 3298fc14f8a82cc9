use resolved_graph::types::*;
use serde_json::json;

#[test]
fn node_extra_fields_are_flattened() {
    let node: Node = serde_json::from_value(json!({
        "id": "n1",
        "data": { "name": "Tommy" },
        "kind": "person",
        "score": 3
    }))
    .unwrap();

    assert_eq!(node.id, "n1");
    assert_eq!(node.data, Some(json!({ "name": "Tommy" })));
    assert_eq!(node.extra.get("kind"), Some(&json!("person")));
    assert_eq!(node.extra.get("score"), Some(&json!(3)));
    assert!(node.extra.get("data").is_none());
}

#[test]
fn node_without_data_omits_it_when_serialized() {
    let value = serde_json::to_value(Node::new("n1")).unwrap();
    assert_eq!(value, json!({ "id": "n1" }));
}

#[test]
fn node_builder_matches_deserialized_form() {
    let built = Node::new("n1")
        .with_data(json!({ "x": 1 }))
        .with_field("kind", json!("person"));
    let parsed: Node =
        serde_json::from_value(json!({ "id": "n1", "data": { "x": 1 }, "kind": "person" })).unwrap();
    assert_eq!(built, parsed);
}

#[test]
fn link_requires_endpoints() {
    let missing_to = serde_json::from_value::<Link>(json!({ "id": "l1", "from": "a" }));
    assert!(missing_to.is_err());

    let link: Link =
        serde_json::from_value(json!({ "id": "l1", "from": "a", "to": "b", "weight": 2 })).unwrap();
    assert_eq!(link, Link::new("l1", "a", "b").with_field("weight", json!(2)));
}

#[test]
fn graph_defaults_to_empty_lists() {
    let graph: Graph = serde_json::from_value(json!({})).unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph, Graph::default());

    let graph: Graph = serde_json::from_value(json!({ "nodes": [{ "id": "a" }] })).unwrap();
    assert!(!graph.is_empty());
    assert!(graph.links.is_empty());
}

#[test]
fn handles_expose_enumeration_index() {
    let graph = resolved_graph::ResolvedGraph::from_graph(&Graph::new(
        vec![Node::new("a"), Node::new("b")],
        vec![Link::new("l", "a", "b")],
    ));
    assert_eq!(graph.node_handle("b").map(NodeHandle::index), Some(1));
    assert_eq!(graph.link_handle("l").map(LinkHandle::index), Some(0));
}

use std::fmt;
use std::ptr;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::{GraphError, Result};
use crate::graph::Candidate;
use crate::types::*;

use super::resolver::{LinkSlot, NodeSlot, ResolvedGraph};

/// A borrowed view of a resolved node.
///
/// Two views are equal when they refer to the same node of the same graph.
#[derive(Clone, Copy)]
pub struct ResolvedNode<'g> {
    graph: &'g ResolvedGraph,
    handle: NodeHandle,
}

/// A borrowed view of a resolved link.
#[derive(Clone, Copy)]
pub struct ResolvedLink<'g> {
    graph: &'g ResolvedGraph,
    handle: LinkHandle,
}

impl<'g> ResolvedNode<'g> {
    pub(super) fn new(graph: &'g ResolvedGraph, handle: NodeHandle) -> Self {
        Self { graph, handle }
    }

    fn slot(&self) -> &'g NodeSlot {
        &self.graph.nodes[self.handle.0]
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    pub fn id(&self) -> &'g str {
        &self.slot().id
    }

    /// The `data` payload, if the node has one.
    pub fn data(&self) -> Option<&'g Value> {
        self.slot().record.get("data")
    }

    /// Any stored top-level field, including `id` and `data`.
    pub fn get(&self, key: &str) -> Option<&'g Value> {
        self.slot().record.get(key)
    }

    /// All stored fields. The derived link lists are not part of it.
    pub fn fields(&self) -> &'g Map<String, Value> {
        &self.slot().record
    }

    /// Links whose source is this node, in link insertion order.
    pub fn outgoing_links(&self) -> impl Iterator<Item = ResolvedLink<'g>> + 'g {
        let graph = self.graph;
        self.slot()
            .outgoing
            .iter()
            .map(move |&handle| ResolvedLink::new(graph, handle))
    }

    /// Links whose destination is this node, in link insertion order.
    pub fn incoming_links(&self) -> impl Iterator<Item = ResolvedLink<'g>> + 'g {
        let graph = self.graph;
        self.slot()
            .incoming
            .iter()
            .map(move |&handle| ResolvedLink::new(graph, handle))
    }

    /// Decodes the `data` payload into `T`. A missing payload decodes as `null`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        decode(self.data())
    }

    /// The node in flat form.
    pub fn to_node(&self) -> Node {
        Node::from_record(self.id(), self.fields())
    }
}

impl<'g> ResolvedLink<'g> {
    pub(super) fn new(graph: &'g ResolvedGraph, handle: LinkHandle) -> Self {
        Self { graph, handle }
    }

    fn slot(&self) -> &'g LinkSlot {
        &self.graph.links[self.handle.0]
    }

    pub fn handle(&self) -> LinkHandle {
        self.handle
    }

    pub fn id(&self) -> &'g str {
        &self.slot().id
    }

    pub fn data(&self) -> Option<&'g Value> {
        self.slot().record.get("data")
    }

    pub fn get(&self, key: &str) -> Option<&'g Value> {
        self.slot().record.get(key)
    }

    /// All stored fields except the endpoints.
    pub fn fields(&self) -> &'g Map<String, Value> {
        &self.slot().record
    }

    /// The source node, or `None` while no node with `from_id` exists.
    pub fn from(&self) -> Option<ResolvedNode<'g>> {
        self.slot()
            .from
            .map(|handle| ResolvedNode::new(self.graph, handle))
    }

    /// The destination node, or `None` while no node with `to_id` exists.
    pub fn to(&self) -> Option<ResolvedNode<'g>> {
        self.slot()
            .to
            .map(|handle| ResolvedNode::new(self.graph, handle))
    }

    pub fn from_id(&self) -> &'g str {
        &self.slot().from_id
    }

    pub fn to_id(&self) -> &'g str {
        &self.slot().to_id
    }

    /// Returns `true` if both endpoints point at stored nodes.
    pub fn is_resolved(&self) -> bool {
        let slot = self.slot();
        slot.from.is_some() && slot.to.is_some()
    }

    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        decode(self.data())
    }

    /// The link in flat form, endpoints as ids.
    pub fn to_link(&self) -> Link {
        Link::from_record(self.id(), self.from_id(), self.to_id(), self.fields())
    }
}

fn decode<T: DeserializeOwned>(data: Option<&Value>) -> Result<T> {
    let value = data.cloned().unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}

impl PartialEq for ResolvedNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.graph, other.graph) && self.handle == other.handle
    }
}

impl Eq for ResolvedNode<'_> {}

impl PartialEq for ResolvedLink<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.graph, other.graph) && self.handle == other.handle
    }
}

impl Eq for ResolvedLink<'_> {}

// Links are printed by id only; printing them in full would recurse forever.
impl fmt::Debug for ResolvedNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outgoing: Vec<&str> = self.outgoing_links().map(|l| l.id()).collect();
        let incoming: Vec<&str> = self.incoming_links().map(|l| l.id()).collect();
        f.debug_struct("ResolvedNode")
            .field("id", &self.id())
            .field("fields", self.fields())
            .field("outgoing", &outgoing)
            .field("incoming", &incoming)
            .finish()
    }
}

impl fmt::Debug for ResolvedLink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedLink")
            .field("id", &self.id())
            .field("fields", self.fields())
            .field("from", &self.from().map(|n| n.id()))
            .field("to", &self.to().map(|n| n.id()))
            .finish()
    }
}

/// What a structural query walks over: plain payload, or a reference into
/// the resolved graph.
#[derive(Clone, Copy)]
pub(super) enum Entity<'g> {
    Payload(&'g Value),
    Node(ResolvedNode<'g>),
    Link(ResolvedLink<'g>),
    Links(&'g ResolvedGraph, &'g [LinkHandle]),
}

impl<'g> Candidate for Entity<'g> {
    fn field(&self, key: &str) -> Option<Self> {
        match *self {
            Entity::Payload(value) => Candidate::field(&value, key).map(Entity::Payload),
            Entity::Node(node) => {
                let config = node.graph.config();
                if key == config.outgoing_field {
                    Some(Entity::Links(node.graph, &node.slot().outgoing))
                } else if key == config.incoming_field {
                    Some(Entity::Links(node.graph, &node.slot().incoming))
                } else {
                    node.get(key).map(Entity::Payload)
                }
            }
            Entity::Link(link) => match key {
                "from" => link.from().map(Entity::Node),
                "to" => link.to().map(Entity::Node),
                _ => link.get(key).map(Entity::Payload),
            },
            Entity::Links(..) => key.parse::<usize>().ok().and_then(|i| self.element(i)),
        }
    }

    fn element(&self, index: usize) -> Option<Self> {
        match *self {
            Entity::Payload(value) => Candidate::element(&value, index).map(Entity::Payload),
            Entity::Links(graph, handles) => handles
                .get(index)
                .map(|&handle| Entity::Link(ResolvedLink::new(graph, handle))),
            Entity::Node(_) | Entity::Link(_) => self.field(&index.to_string()),
        }
    }

    fn scalar(&self) -> Option<&Value> {
        match self {
            Entity::Payload(value) => Candidate::scalar(value),
            _ => None,
        }
    }
}

/// In-place mutator for a stored node's payload.
///
/// Changes are visible through every handle and view of the node. They are not
/// re-resolved, and `id` plus the derived link list fields are read-only.
pub struct NodeMut<'g> {
    graph: &'g mut ResolvedGraph,
    handle: NodeHandle,
}

impl<'g> NodeMut<'g> {
    pub(super) fn new(graph: &'g mut ResolvedGraph, handle: NodeHandle) -> Self {
        Self { graph, handle }
    }

    fn slot(&mut self) -> &mut NodeSlot {
        &mut self.graph.nodes[self.handle.0]
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    pub fn id(&self) -> &str {
        &self.graph.nodes[self.handle.0].id
    }

    /// The `data` payload, created as `null` if absent.
    pub fn data_mut(&mut self) -> &mut Value {
        self.slot()
            .record
            .entry("data")
            .or_insert(Value::Null)
    }

    /// Replaces the `data` payload, returning the previous one.
    pub fn set_data(&mut self, data: Value) -> Option<Value> {
        self.slot().record.insert("data".to_string(), data)
    }

    /// Sets a top-level field, returning the previous value.
    pub fn insert(&mut self, key: &str, value: Value) -> Result<Option<Value>> {
        self.check_writable(key)?;
        Ok(self.slot().record.insert(key.to_string(), value))
    }

    /// Removes a top-level field, returning its value.
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        self.check_writable(key)?;
        Ok(self.slot().record.remove(key))
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if key == "id" || self.graph.config().is_derived_node_field(key) {
            return Err(GraphError::ImmutableField {
                field: key.to_string(),
            });
        }
        Ok(())
    }
}

/// In-place mutator for a stored link's payload. `id`, `from` and `to` are
/// read-only.
pub struct LinkMut<'g> {
    graph: &'g mut ResolvedGraph,
    handle: LinkHandle,
}

impl<'g> LinkMut<'g> {
    pub(super) fn new(graph: &'g mut ResolvedGraph, handle: LinkHandle) -> Self {
        Self { graph, handle }
    }

    fn slot(&mut self) -> &mut LinkSlot {
        &mut self.graph.links[self.handle.0]
    }

    pub fn handle(&self) -> LinkHandle {
        self.handle
    }

    pub fn id(&self) -> &str {
        &self.graph.links[self.handle.0].id
    }

    pub fn data_mut(&mut self) -> &mut Value {
        self.slot()
            .record
            .entry("data")
            .or_insert(Value::Null)
    }

    pub fn set_data(&mut self, data: Value) -> Option<Value> {
        self.slot().record.insert("data".to_string(), data)
    }

    pub fn insert(&mut self, key: &str, value: Value) -> Result<Option<Value>> {
        check_link_writable(key)?;
        Ok(self.slot().record.insert(key.to_string(), value))
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        check_link_writable(key)?;
        Ok(self.slot().record.remove(key))
    }
}

fn check_link_writable(key: &str) -> Result<()> {
    if matches!(key, "id" | "from" | "to") {
        return Err(GraphError::ImmutableField {
            field: key.to_string(),
        });
    }
    Ok(())
}

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::config::GraphConfig;
use crate::errors::Result;
use crate::graph::{matches, merge_fields};
use crate::types::*;

use super::view::{Entity, LinkMut, NodeMut, ResolvedLink, ResolvedNode};

/// Storage for one resolved node.
///
/// `outgoing` and `incoming` are kept sorted by handle, which is also link
/// enumeration order.
#[derive(Debug, Clone)]
pub(super) struct NodeSlot {
    pub(super) id: String,
    pub(super) record: Map<String, Value>,
    pub(super) outgoing: Vec<LinkHandle>,
    pub(super) incoming: Vec<LinkHandle>,
}

/// Storage for one resolved link.
///
/// The endpoint ids are retained next to the resolved handles so that a
/// dangling endpoint can be resolved once its node shows up.
#[derive(Debug, Clone)]
pub(super) struct LinkSlot {
    pub(super) id: String,
    pub(super) record: Map<String, Value>,
    pub(super) from_id: String,
    pub(super) to_id: String,
    pub(super) from: Option<NodeHandle>,
    pub(super) to: Option<NodeHandle>,
}

/// A graph whose nodes reference their incident links and whose links
/// reference their endpoint nodes.
///
/// Entities live in an arena and are identified by handles that never change:
/// setting or merging an id that already exists updates the entity in place,
/// so every holder of its handle observes the new data.
///
/// Resolving a node scans the whole link store (O(L)); resolving a link is two
/// id lookups. A full `merge_graph` is therefore O(N·L) in the worst case.
///
/// The graph is single-writer: it is `Send` but offers no internal locking.
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    config: GraphConfig,
    pub(super) nodes: Vec<NodeSlot>,
    pub(super) links: Vec<LinkSlot>,
    node_ids: HashMap<String, NodeHandle>,
    link_ids: HashMap<String, LinkHandle>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

impl ResolvedGraph {
    /// Creates an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with the given configuration.
    ///
    /// Fails if the configuration does not pass [`GraphConfig::validate`].
    pub fn with_config(config: GraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Creates a graph and resolves `graph` into it.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut resolved = Self::new();
        resolved.merge_graph(graph);
        resolved
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }
}

impl From<Graph> for ResolvedGraph {
    fn from(graph: Graph) -> Self {
        Self::from_graph(&graph)
    }
}

impl From<&Graph> for ResolvedGraph {
    fn from(graph: &Graph) -> Self {
        Self::from_graph(graph)
    }
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

impl ResolvedGraph {
    /// Merges a flat graph into the resolved graph.
    ///
    /// Every link and node is deep-merged into the store first; only then are
    /// the touched links and nodes re-resolved, so links resolve against nodes
    /// of the same batch regardless of their order.
    pub fn merge_graph(&mut self, graph: &Graph) {
        let link_handles: Vec<LinkHandle> = graph
            .links
            .iter()
            .map(|link| self.merge_link_record(link))
            .collect();
        let node_handles: Vec<NodeHandle> = graph
            .nodes
            .iter()
            .map(|node| self.merge_node_record(node))
            .collect();

        for handle in link_handles {
            self.resolve_link(handle);
        }
        for handle in node_handles {
            self.resolve_node(handle);
        }

        debug!(
            merged_nodes = graph.nodes.len(),
            merged_links = graph.links.len(),
            node_count = self.nodes.len(),
            link_count = self.links.len(),
            "merged graph"
        );
    }

    /// Creates a node or replaces every field of the existing one.
    ///
    /// Fields of the stored node that `node` lacks are removed; `id` and the
    /// derived link lists are kept. The handle of an existing node is reused.
    pub fn set_node(&mut self, node: Node) -> NodeHandle {
        let record = self.node_record(&node);
        let handle = self.node_slot(&node.id);
        self.nodes[handle.0].record = record;
        self.resolve_node(handle);
        handle
    }

    /// Creates a node or deep-merges `node` into the existing one, keeping
    /// fields that `node` does not mention.
    pub fn merge_node(&mut self, node: &Node) -> NodeHandle {
        let handle = self.merge_node_record(node);
        self.resolve_node(handle);
        handle
    }

    /// Creates a link or replaces every field of the existing one, then
    /// re-resolves its endpoints.
    pub fn set_link(&mut self, link: Link) -> LinkHandle {
        let record = link.to_record();
        let handle = self.link_slot(&link.id);
        let slot = &mut self.links[handle.0];
        slot.record = record;
        slot.from_id = link.from;
        slot.to_id = link.to;
        self.resolve_link(handle);
        handle
    }

    /// Creates a link or deep-merges `link` into the existing one, then
    /// re-resolves its endpoints.
    pub fn merge_link(&mut self, link: &Link) -> LinkHandle {
        let handle = self.merge_link_record(link);
        self.resolve_link(handle);
        handle
    }

    /// Returns a mutator for the payload of the node with the given id.
    ///
    /// Edits made through it are not re-resolved; they cannot touch `id` or
    /// the link lists, so resolution stays valid.
    pub fn node_mut(&mut self, id: &str) -> Option<NodeMut<'_>> {
        let handle = self.node_ids.get(id).copied()?;
        Some(NodeMut::new(self, handle))
    }

    /// Returns a mutator for the payload of the link with the given id.
    ///
    /// `from` and `to` cannot be changed through it; use `set_link` or
    /// `merge_link` to move a link.
    pub fn link_mut(&mut self, id: &str) -> Option<LinkMut<'_>> {
        let handle = self.link_ids.get(id).copied()?;
        Some(LinkMut::new(self, handle))
    }

    fn merge_node_record(&mut self, node: &Node) -> NodeHandle {
        let incoming = self.node_record(node);
        let handle = self.node_slot(&node.id);
        merge_fields(&mut self.nodes[handle.0].record, &incoming);
        handle
    }

    fn merge_link_record(&mut self, link: &Link) -> LinkHandle {
        let incoming = link.to_record();
        let handle = self.link_slot(&link.id);
        let slot = &mut self.links[handle.0];
        merge_fields(&mut slot.record, &incoming);
        slot.from_id.clone_from(&link.from);
        slot.to_id.clone_from(&link.to);
        handle
    }

    /// Flattens `node`, dropping fields that collide with the derived link lists.
    fn node_record(&self, node: &Node) -> Map<String, Value> {
        let mut record = node.to_record();
        for field in [&self.config.outgoing_field, &self.config.incoming_field] {
            if record.remove(field.as_str()).is_some() {
                debug!(node = %node.id, field = %field, "ignoring derived field on flat node");
            }
        }
        record
    }

    fn node_slot(&mut self, id: &str) -> NodeHandle {
        if let Some(&handle) = self.node_ids.get(id) {
            return handle;
        }
        let handle = NodeHandle(self.nodes.len());
        let mut record = Map::new();
        record.insert("id".to_string(), Value::String(id.to_string()));
        self.nodes.push(NodeSlot {
            id: id.to_string(),
            record,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        });
        self.node_ids.insert(id.to_string(), handle);
        trace!(node = id, "created node");
        handle
    }

    fn link_slot(&mut self, id: &str) -> LinkHandle {
        if let Some(&handle) = self.link_ids.get(id) {
            return handle;
        }
        let handle = LinkHandle(self.links.len());
        let mut record = Map::new();
        record.insert("id".to_string(), Value::String(id.to_string()));
        self.links.push(LinkSlot {
            id: id.to_string(),
            record,
            from_id: String::new(),
            to_id: String::new(),
            from: None,
            to: None,
        });
        self.link_ids.insert(id.to_string(), handle);
        trace!(link = id, "created link");
        handle
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl ResolvedGraph {
    /// Rebuilds a node's link lists by scanning every stored link.
    ///
    /// Links that were waiting for this node's id get their endpoint resolved
    /// along the way.
    fn resolve_node(&mut self, handle: NodeHandle) {
        let id = self.nodes[handle.0].id.clone();
        let mut outgoing = Vec::new();
        let mut incoming = Vec::new();

        for (i, link) in self.links.iter_mut().enumerate() {
            if link.from_id == id {
                link.from = Some(handle);
                outgoing.push(LinkHandle(i));
            }
            if link.to_id == id {
                link.to = Some(handle);
                incoming.push(LinkHandle(i));
            }
        }

        trace!(
            node = %id,
            outgoing = outgoing.len(),
            incoming = incoming.len(),
            "resolved node"
        );

        let slot = &mut self.nodes[handle.0];
        slot.outgoing = outgoing;
        slot.incoming = incoming;
    }

    /// Points a link at the nodes named by its endpoint ids and moves it
    /// between the link lists of the old and new endpoint nodes.
    fn resolve_link(&mut self, handle: LinkHandle) {
        let link = &self.links[handle.0];
        let from = self.node_ids.get(&link.from_id).copied();
        let to = self.node_ids.get(&link.to_id).copied();
        let (old_from, old_to) = (link.from, link.to);

        if old_from != from {
            if let Some(node) = old_from {
                detach(&mut self.nodes[node.0].outgoing, handle);
            }
            if let Some(node) = from {
                attach(&mut self.nodes[node.0].outgoing, handle);
            }
        }
        if old_to != to {
            if let Some(node) = old_to {
                detach(&mut self.nodes[node.0].incoming, handle);
            }
            if let Some(node) = to {
                attach(&mut self.nodes[node.0].incoming, handle);
            }
        }

        let link = &mut self.links[handle.0];
        link.from = from;
        link.to = to;
        trace!(link = %link.id, from = %link.from_id, to = %link.to_id, "resolved link");

        if from.is_none() || to.is_none() {
            self.report_dangling(handle);
        }
    }

    fn report_dangling(&self, handle: LinkHandle) {
        let link = &self.links[handle.0];
        let from = if link.from.is_some() { "resolved" } else { link.from_id.as_str() };
        let to = if link.to.is_some() { "resolved" } else { link.to_id.as_str() };
        if self.config.warn_on_dangling {
            warn!(link = %link.id, from, to, "link endpoint unresolved");
        } else {
            debug!(link = %link.id, from, to, "link endpoint unresolved");
        }
    }
}

fn attach(list: &mut Vec<LinkHandle>, handle: LinkHandle) {
    if let Err(pos) = list.binary_search(&handle) {
        list.insert(pos, handle);
    }
}

fn detach(list: &mut Vec<LinkHandle>, handle: LinkHandle) {
    if let Ok(pos) = list.binary_search(&handle) {
        list.remove(pos);
    }
}

// ---------------------------------------------------------------------------
// Lookup & queries
// ---------------------------------------------------------------------------

impl ResolvedGraph {
    /// Returns the node with the given id.
    pub fn node(&self, id: &str) -> Option<ResolvedNode<'_>> {
        self.node_ids
            .get(id)
            .map(|&handle| ResolvedNode::new(self, handle))
    }

    /// Returns the link with the given id.
    pub fn link(&self, id: &str) -> Option<ResolvedLink<'_>> {
        self.link_ids
            .get(id)
            .map(|&handle| ResolvedLink::new(self, handle))
    }

    /// Returns the node behind a handle obtained from this graph.
    pub fn node_by_handle(&self, handle: NodeHandle) -> Option<ResolvedNode<'_>> {
        (handle.0 < self.nodes.len()).then(|| ResolvedNode::new(self, handle))
    }

    /// Returns the link behind a handle obtained from this graph.
    pub fn link_by_handle(&self, handle: LinkHandle) -> Option<ResolvedLink<'_>> {
        (handle.0 < self.links.len()).then(|| ResolvedLink::new(self, handle))
    }

    /// Returns the handle of the node with the given id.
    pub fn node_handle(&self, id: &str) -> Option<NodeHandle> {
        self.node_ids.get(id).copied()
    }

    /// Returns the handle of the link with the given id.
    pub fn link_handle(&self, id: &str) -> Option<LinkHandle> {
        self.link_ids.get(id).copied()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = ResolvedNode<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| ResolvedNode::new(self, NodeHandle(i)))
    }

    /// All links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = ResolvedLink<'_>> + '_ {
        (0..self.links.len()).map(move |i| ResolvedLink::new(self, LinkHandle(i)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Returns the first node matching `query`.
    ///
    /// The query is a partial record. It may follow references through the
    /// configured link list fields and a link's `from`/`to`:
    ///
    /// ```
    /// # use resolved_graph::{Graph, Link, Node, ResolvedGraph};
    /// # use serde_json::json;
    /// let graph = ResolvedGraph::from_graph(&Graph::new(
    ///     vec![Node::new("A"), Node::new("B")],
    ///     vec![Link::new("1", "A", "B")],
    /// ));
    /// let a = graph.find_node(&json!({ "outgoingLinks": [{ "to": { "id": "B" } }] }));
    /// assert_eq!(a.map(|n| n.id()), Some("A"));
    /// ```
    ///
    /// Arrays match by position, so the example only finds `A` because the
    /// link to `B` is its first outgoing link.
    pub fn find_node(&self, query: &Value) -> Option<ResolvedNode<'_>> {
        self.nodes()
            .find(|node| matches(&Entity::Node(*node), query))
    }

    /// Returns every node matching `query`, in insertion order.
    pub fn find_nodes(&self, query: &Value) -> Vec<ResolvedNode<'_>> {
        self.nodes()
            .filter(|node| matches(&Entity::Node(*node), query))
            .collect()
    }

    /// Returns the first link matching `query`.
    pub fn find_link(&self, query: &Value) -> Option<ResolvedLink<'_>> {
        self.links()
            .find(|link| matches(&Entity::Link(*link), query))
    }

    /// Returns every link matching `query`, in insertion order.
    pub fn find_links(&self, query: &Value) -> Vec<ResolvedLink<'_>> {
        self.links()
            .filter(|link| matches(&Entity::Link(*link), query))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dissolve
// ---------------------------------------------------------------------------

impl ResolvedGraph {
    /// Converts the resolved graph back to its flat form.
    ///
    /// Node link lists are dropped and link endpoints become node ids again.
    /// An endpoint that never resolved keeps the id it was given.
    pub fn dissolve(&self) -> Graph {
        let nodes = self
            .nodes
            .iter()
            .map(|slot| Node::from_record(&slot.id, &slot.record))
            .collect();
        let links = self
            .links
            .iter()
            .map(|slot| {
                let from = slot
                    .from
                    .map_or(slot.from_id.as_str(), |node| self.nodes[node.0].id.as_str());
                let to = slot
                    .to
                    .map_or(slot.to_id.as_str(), |node| self.nodes[node.0].id.as_str());
                Link::from_record(&slot.id, from, to, &slot.record)
            })
            .collect();
        Graph { nodes, links }
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A node in the flat interchange form.
///
/// `id` is the immutable primary key. `data` carries the payload; any other
/// fields are kept in `extra` and survive resolution and dissolving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A link in the flat interchange form: a node-shaped record plus the ids of
/// its source (`from`) and destination (`to`) nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The flat interchange form of a graph. Link endpoints may dangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only an absent field is `None`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Stable identity of a resolved node inside one `ResolvedGraph`.
///
/// A handle never changes for the lifetime of the graph, no matter how often
/// the node behind it is set or merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

/// Stable identity of a resolved link inside one `ResolvedGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkHandle(pub(crate) usize);

impl NodeHandle {
    /// Position of the node in enumeration order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl LinkHandle {
    /// Position of the link in enumeration order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl Node {
    /// Creates a node with the given id and no payload.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds an extra top-level field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Flattens the node into a single record holding `id`, `data` and extras.
    pub(crate) fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        for (key, value) in &self.extra {
            if key != "id" && key != "data" {
                record.insert(key.clone(), value.clone());
            }
        }
        record.insert("id".to_string(), Value::String(self.id.clone()));
        if let Some(data) = &self.data {
            record.insert("data".to_string(), data.clone());
        }
        record
    }

    /// Rebuilds a flat node from a stored record.
    pub(crate) fn from_record(id: &str, record: &Map<String, Value>) -> Self {
        let mut extra = record.clone();
        extra.remove("id");
        let data = extra.remove("data");
        Self {
            id: id.to_string(),
            data,
            extra,
        }
    }
}

impl Link {
    /// Creates a link between two node ids with no payload.
    pub fn new(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            ..Self::default()
        }
    }

    /// Sets the payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Adds an extra top-level field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Flattens the link's non-endpoint fields into a single record.
    ///
    /// `from` and `to` are kept out of the record: a resolved link holds them
    /// as node references instead.
    pub(crate) fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        for (key, value) in &self.extra {
            if !matches!(key.as_str(), "id" | "data" | "from" | "to") {
                record.insert(key.clone(), value.clone());
            }
        }
        record.insert("id".to_string(), Value::String(self.id.clone()));
        if let Some(data) = &self.data {
            record.insert("data".to_string(), data.clone());
        }
        record
    }

    /// Rebuilds a flat link from a stored record and its endpoint ids.
    pub(crate) fn from_record(id: &str, from: &str, to: &str, record: &Map<String, Value>) -> Self {
        let mut extra = record.clone();
        extra.remove("id");
        let data = extra.remove("data");
        Self {
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            data,
            extra,
        }
    }
}

impl Graph {
    /// Creates a flat graph from its parts.
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    /// Returns `true` if the graph has neither nodes nor links.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }
}

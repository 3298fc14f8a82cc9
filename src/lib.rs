//! A resolved view of a flat directed graph.
//!
//! Feed flat [`Graph`], [`Node`] and [`Link`] records into a [`ResolvedGraph`]
//! and every node gets direct access to its incident links, and every link to
//! its endpoint nodes, without id lookups during traversal.
//!
//! ```
//! use resolved_graph::{Graph, Link, Node, ResolvedGraph};
//! use serde_json::json;
//!
//! let graph = ResolvedGraph::from_graph(&Graph::new(
//!     vec![
//!         Node::new("1").with_data(json!({ "name": "Tommy" })),
//!         Node::new("2").with_data(json!({ "name": "Viktoria" })),
//!     ],
//!     vec![Link::new("3", "1", "2").with_data(json!({ "label": "is in love with" }))],
//! ));
//!
//! let tommy = graph.find_node(&json!({ "data": { "name": "Tommy" } })).unwrap();
//! let link = tommy.outgoing_links().next().unwrap();
//! assert_eq!(link.to().unwrap().id(), "2");
//! ```
pub mod config;
pub mod errors;
pub mod graph;
pub mod resolution;
pub mod types;

pub use config::GraphConfig;
pub use errors::{GraphError, Result};
pub use resolution::{LinkMut, NodeMut, ResolvedGraph, ResolvedLink, ResolvedNode};
pub use types::{Graph, Link, LinkHandle, Node, NodeHandle};

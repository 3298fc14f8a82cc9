/// Resolution engine.
///
/// Stores nodes and links keyed by id in an arena and keeps every link's
/// endpoint references and every node's link lists consistent after each
/// mutation. Callers hold `NodeHandle`/`LinkHandle` values or borrowed views
/// rather than ids.
mod resolver;
mod view;

pub use resolver::ResolvedGraph;
pub use view::{LinkMut, NodeMut, ResolvedLink, ResolvedNode};

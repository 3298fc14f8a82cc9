/// Recursive union-merge of JSON records.
pub mod merge;

/// Recursive partial-match predicate used by structural queries.
pub mod queries;

pub use merge::{merge_fields, merge_value};
pub use queries::{matches, Candidate};

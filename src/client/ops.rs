//! Operation Classification Tables
//!
//! The finite set of remote operations the interceptor knows how to handle,
//! grouped by semantic kind. The union of these sets is the intercepted
//! surface; anything else is forwarded untouched.

use std::collections::HashMap;

/// Cacheable read operations whose raw result becomes the cached value.
pub const QUERY_OPS: &[&str] = &[
    "count",
    "count_percolate",
    "exists",
    "get",
    "get_script",
    "get_source",
    "get_template",
    "mget",
    "msearch",
    "msearch_template",
    "search",
    "search_shards",
    "search_template",
    "suggest",
];

/// Create/update-style writes whose request body becomes the cached value.
pub const ADD_OPS: &[&str] = &["create", "index", "update", "update_by_query"];

/// Writes that must invalidate the cache key once they succeed.
pub const DELETE_OPS: &[&str] = &[
    "delete",
    "delete_by_query",
    "delete_script",
    "delete_template",
];

/// Writes whose target resource may need series routing, including bulk.
pub const INDEXABLE_OPS: &[&str] = &["bulk", "create", "index", "update", "update_by_query"];

// == Operation Traits ==
/// The semantic kinds a single operation belongs to. The sets overlap: an
/// `index` call is both add-kind and indexable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpTraits {
    pub query: bool,
    pub add: bool,
    pub delete: bool,
    pub indexable: bool,
}

/// Builds the dispatch table the interceptor consults per call.
pub(crate) fn op_table() -> HashMap<&'static str, OpTraits> {
    let mut table: HashMap<&'static str, OpTraits> = HashMap::new();
    for &op in QUERY_OPS {
        table.entry(op).or_default().query = true;
    }
    for &op in ADD_OPS {
        table.entry(op).or_default().add = true;
    }
    for &op in DELETE_OPS {
        table.entry(op).or_default().delete = true;
    }
    for &op in INDEXABLE_OPS {
        table.entry(op).or_default().indexable = true;
    }
    table
}

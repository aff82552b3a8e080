//! Client Module
//!
//! The remote client boundary and the transparent call interceptor that
//! applies caching, statistics and series routing in front of it.

mod interceptor;
mod ops;
mod remote;

// Re-export public types
pub use interceptor::Interceptor;
pub use ops::{OpTraits, ADD_OPS, DELETE_OPS, INDEXABLE_OPS, QUERY_OPS};
pub use remote::RemoteClient;

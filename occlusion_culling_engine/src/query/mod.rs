//! Occlusion query module
//!
//! Query wrappers and the fixed-size pool that owns their handles.

mod query;
mod query_pool;

pub use query::Query;
pub use query_pool::QueryPool;

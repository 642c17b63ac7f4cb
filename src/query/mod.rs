//! Query-result caching with a freshness window and inactivity eviction.

mod cache;

pub use cache::{Lookup, QueryCache};

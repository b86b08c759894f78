//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod http_upstream_adapter;

pub use http_upstream_adapter::HttpUpstreamAdapter;

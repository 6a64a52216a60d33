//! Mystack Store - durable stack descriptions for the multi-tenant controller
//!
//! Persists raw stack YAML keyed by cluster name, plus the derived
//! custom-domain index used by the routing layer, in a SQLite database.

pub mod error;
pub mod registry;

pub use error::{Result, StoreError};
pub use registry::{ConfigRegistry, build_domain_insert};

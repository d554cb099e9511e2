//! Transformation module.
//!
//! - Enrich: raw rows to enriched transactions
//! - Explode: enriched transactions to per-product rows
//! - Pipeline: load, enrich, explode, then assemble the dashboard

pub mod enrich;
pub mod explode;
pub mod pipeline;

pub use enrich::enrich;
pub use explode::explode;
pub use pipeline::*;

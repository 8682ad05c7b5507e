//! Record set transformations
//!
//! This module provides the stages between parsing and synthesis:
//! - Identity-based deduplication
//! - Collision-free display naming

mod dedup;
mod naming;

pub use dedup::{IdentityDeduplicator, dedup_records};
pub use naming::NameResolver;

//! Identity-based deduplication.
//!
//! Two records name the same endpoint when their lower-cased
//! `(host, port, identity)` triples match. Display name and transport
//! options play no part; the first record seen wins.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::parser::{IdentityKey, ProxyRecord};

/// Drops records whose identity key was already seen.
///
/// State persists across calls, so several batches fed through one
/// instance are deduplicated against each other.
#[derive(Debug, Default)]
pub struct IdentityDeduplicator {
    seen: HashSet<IdentityKey>,
    dropped: usize,
}

impl IdentityDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first occurrence of every identity key, preserving order.
    pub fn dedup(&mut self, records: Vec<ProxyRecord>) -> Vec<ProxyRecord> {
        let original_count = records.len();
        let unique: Vec<ProxyRecord> = records
            .into_iter()
            .filter(|record| {
                let fresh = self.seen.insert(record.identity_key());
                if !fresh {
                    debug!(
                        "Dropping duplicate '{}' ({})",
                        record.display_name,
                        record.endpoint()
                    );
                }
                fresh
            })
            .collect();

        let removed = original_count - unique.len();
        self.dropped += removed;
        if removed > 0 {
            info!("Duplicates removed: {}", removed);
        }

        unique
    }

    /// Total records dropped by this instance so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of distinct endpoints seen so far.
    pub fn unique_count(&self) -> usize {
        self.seen.len()
    }
}

/// One-shot deduplication with fresh state.
pub fn dedup_records(records: Vec<ProxyRecord>) -> Vec<ProxyRecord> {
    IdentityDeduplicator::new().dedup(records)
}

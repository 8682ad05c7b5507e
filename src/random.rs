//! Randomness used for placeholder names and collision suffixes.
//!
//! Parsing and naming never call `rand` directly; they go through
//! [`RandomSource`] so tests can swap in [`SequenceSource`].

use std::sync::atomic::{AtomicU64, Ordering};

/// Produces short lowercase hex strings.
pub trait RandomSource: Send + Sync {
    /// Returns exactly `len` lowercase hex digits.
    fn hex(&self, len: usize) -> String;
}

/// Thread-local RNG backed source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn hex(&self, len: usize) -> String {
        (0..len)
            .map(|_| {
                let nibble = rand::random::<u8>() & 0x0f;
                char::from_digit(u32::from(nibble), 16).unwrap_or('0')
            })
            .collect()
    }
}

/// Deterministic source: yields a zero-padded counter, one step per call.
#[derive(Debug, Default)]
pub struct SequenceSource {
    next: AtomicU64,
}

impl SequenceSource {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl RandomSource for SequenceSource {
    fn hex(&self, len: usize) -> String {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        let digits = format!("{:0width$x}", value, width = len);
        // keep the low-order digits when the counter outgrows `len`
        digits[digits.len() - len..].to_string()
    }
}

//! Link Parsing Module
//!
//! This module provides functionality for:
//! - Detecting link list content types (plain text, Base64)
//! - Parsing `vless://` links into validated [`ProxyRecord`]s
//! - Batch parsing where a bad line is counted and skipped, never fatal

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod detection;
mod error;
pub mod host;
pub mod query;
pub mod record;
pub mod vless;

pub use detection::{ListType, decode_base64_text, detect_list_type};
pub use error::RejectReason;
pub use record::{
    IdentityKey, ProxyRecord, RealityParams, SecurityMode, TlsParams, Transport, TransportParams,
};
pub use vless::VLessParser;

// ============================================================================
// Parse Policy
// ============================================================================

/// What to do with a `flow` value outside the whitelist.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlowPolicy {
    /// Reject the whole link
    #[default]
    Reject,
    /// Keep the link, drop the flow
    Clear,
}

/// Per-batch validation policy. Applied uniformly to every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePolicy {
    /// Reject links whose security is not `reality`
    pub require_reality: bool,
    pub flow_policy: FlowPolicy,
}

impl Default for ParsePolicy {
    fn default() -> Self {
        Self {
            require_reality: true,
            flow_policy: FlowPolicy::Reject,
        }
    }
}

// ============================================================================
// Link Parser Trait
// ============================================================================

/// Turns one raw link line into a validated record.
pub trait LinkParser: Send + Sync {
    /// Scheme this parser handles (e.g. "vless")
    fn scheme(&self) -> &str;

    /// Parses a single line. Never panics on bad input.
    fn parse(&self, line: &str) -> Result<ProxyRecord, RejectReason>;

    /// Checks if this parser can handle the given line
    fn can_parse(&self, line: &str) -> bool {
        line.starts_with(&format!("{}://", self.scheme()))
    }
}

// ============================================================================
// Batch Parsing
// ============================================================================

/// A rejected line and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 1-based line number in the source text
    pub line: usize,
    pub reason: RejectReason,
}

/// Result of parsing a whole link list.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Accepted records, in input order
    pub records: Vec<ProxyRecord>,
    pub rejections: Vec<Rejection>,
    /// Non-blank, non-comment lines seen
    pub candidate_lines: usize,
}

impl ParseReport {
    pub fn accepted(&self) -> usize {
        self.records.len()
    }

    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }

    /// Rejection counts keyed by [`RejectReason::kind`].
    pub fn rejections_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for rejection in &self.rejections {
            *counts.entry(rejection.reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// Returns `true` for lines that carry no link (blank or `#` comments).
pub fn is_ignorable_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// Parses every line of `content`, collecting records and rejections.
pub fn parse_link_list(parser: &dyn LinkParser, content: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (index, line) in content.lines().enumerate() {
        if is_ignorable_line(line) {
            continue;
        }
        report.candidate_lines += 1;

        match parser.parse(line) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                let preview: String = line.trim().chars().take(60).collect();
                debug!("Rejected line {}: {} ({})", index + 1, reason, preview);
                report.rejections.push(Rejection {
                    line: index + 1,
                    reason,
                });
            }
        }
    }

    debug!(
        "Link list parsing complete: {} candidate lines, {} accepted, {} rejected",
        report.candidate_lines,
        report.accepted(),
        report.rejected()
    );
    if report.accepted() == 0 && report.candidate_lines > 0 {
        warn!("No valid links in {} candidate lines", report.candidate_lines);
    }

    report
}

//! Text-in, document-out pipeline.
//!
//! parse -> dedup -> name -> synthesize. Every run owns fresh dedup and
//! naming state, so concurrent or repeated runs never see each other.
//! No I/O happens here.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::config::StashConfig;
use crate::config::validation::IntegrityError;
use crate::parser::{ParsePolicy, ProxyRecord, VLessParser, parse_link_list};
use crate::random::{RandomSource, ThreadRandom};
use crate::synthesizer::{ConfigSynthesizer, SynthesizerOptions};
use crate::transform::{IdentityDeduplicator, NameResolver};

/// Counters collected during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Lines in the input text
    pub lines: usize,
    /// Lines that were neither blank nor comments
    pub candidate_lines: usize,
    pub accepted: usize,
    /// Rejections per reason label
    pub rejected: BTreeMap<&'static str, usize>,
    pub duplicates: usize,
    /// Proxies in the final document
    pub final_count: usize,
}

impl PipelineStats {
    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub document: StashConfig,
    /// Final, uniquely named records in document order
    pub records: Vec<ProxyRecord>,
    pub stats: PipelineStats,
}

impl PipelineOutput {
    /// `true` when no link survived parsing and dedup.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct Pipeline {
    parser: VLessParser,
    synthesizer: ConfigSynthesizer,
    random: Arc<dyn RandomSource>,
}

impl Pipeline {
    pub fn new(policy: ParsePolicy, options: SynthesizerOptions) -> Self {
        Self::with_random(policy, options, Arc::new(ThreadRandom))
    }

    /// Uses `random` for placeholder names and collision suffixes.
    pub fn with_random(
        policy: ParsePolicy,
        options: SynthesizerOptions,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            parser: VLessParser::with_random(policy, Arc::clone(&random)),
            synthesizer: ConfigSynthesizer::new(options),
            random,
        }
    }

    /// Runs every stage over `text`.
    ///
    /// Bad lines are counted and skipped. Zero surviving records is a
    /// valid outcome; check [`PipelineOutput::is_empty`].
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError`] if the synthesized document is not
    /// self-consistent.
    pub fn run(&self, text: &str) -> Result<PipelineOutput, IntegrityError> {
        let report = parse_link_list(&self.parser, text);
        info!(
            "Valid links: {} (rejected: {})",
            report.accepted(),
            report.rejected()
        );

        let mut stats = PipelineStats {
            lines: text.lines().count(),
            candidate_lines: report.candidate_lines,
            accepted: report.accepted(),
            rejected: report.rejections_by_kind(),
            ..Default::default()
        };

        let mut dedup = IdentityDeduplicator::new();
        let unique = dedup.dedup(report.records);
        stats.duplicates = dedup.dropped();

        let mut resolver = NameResolver::with_random(Arc::clone(&self.random));
        resolver.reserve(self.synthesizer.reserved_names());
        let records = resolver.resolve(unique);
        stats.final_count = records.len();

        info!("Final unique proxies: {}", stats.final_count);

        let document = self.synthesizer.synthesize(&records)?;
        Ok(PipelineOutput {
            document,
            records,
            stats,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ParsePolicy::default(), SynthesizerOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceSource;

    const UUID: &str = "b831381d-6324-4d53-ad4f-8cda48b30811";

    fn pipeline() -> Pipeline {
        Pipeline::with_random(
            ParsePolicy::default(),
            SynthesizerOptions::default(),
            Arc::new(SequenceSource::new(0)),
        )
    }

    fn link(host: &str, name: &str) -> String {
        format!("vless://{UUID}@{host}:443?security=reality&pbk=KEY&sni=example.com#{name}")
    }

    #[test]
    fn test_stats() {
        let text = [
            "# header".to_string(),
            String::new(),
            link("1.1.1.1", "A"),
            link("1.1.1.1", "A-copy"),
            link("2.2.2.2", "A"),
            "vless://bad".to_string(),
            "trojan://x@y:1".to_string(),
        ]
        .join("\n");

        let output = pipeline().run(&text).unwrap();
        let stats = &output.stats;
        assert_eq!(stats.lines, 7);
        assert_eq!(stats.candidate_lines, 5);
        assert_eq!(stats.accepted, 3);
        assert_eq!(stats.total_rejected(), 2);
        assert_eq!(stats.rejected.get("missing-scheme"), Some(&1));
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.final_count, 2);

        let names: Vec<&str> = output.records.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["A", "A (2)"]);
        assert_eq!(output.document.proxy_names(), names);
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        let output = pipeline().run("").unwrap();
        assert!(output.is_empty());
        assert_eq!(output.stats, PipelineStats::default());
        assert!(output.document.validate().is_ok());
    }

    #[test]
    fn test_proxy_named_like_group_is_renamed() {
        let output = pipeline()
            .run(&link("1.1.1.1", "%F0%9F%9A%80%20Main%20Proxy"))
            .unwrap();
        assert_eq!(output.records[0].display_name, "🚀 Main Proxy-0000");
    }

    #[test]
    fn test_runs_are_independent() {
        let pipeline = pipeline();
        let text = link("1.1.1.1", "A");
        let first = pipeline.run(&text).unwrap();
        let second = pipeline.run(&text).unwrap();
        assert_eq!(first.stats.duplicates, 0);
        assert_eq!(second.stats.duplicates, 0);
        assert_eq!(second.records[0].display_name, "A");
    }
}

//! Config Synthesis Module
//!
//! Builds the complete client document from named proxy records plus the
//! static templates: DNS policy, proxy groups, rule providers and the
//! ordered rule list. The document is integrity-checked before it is
//! returned.

use linked_hash_map::LinkedHashMap;
use tracing::{debug, info};

use crate::config::group::ProxyGroup;
use crate::config::rule::{Rule, Target};
use crate::config::rule_provider::RuleProvider;
use crate::config::util::{DIRECT, REJECT};
use crate::config::validation::IntegrityError;
use crate::config::{LogLevel, Mode, Script, StashConfig};
use crate::parser::ProxyRecord;

pub mod proxy;
pub mod templates;

use templates::{
    ADBLOCK_GROUP, ADS_PROVIDER, AUTO_GROUP, AUTO_INTERVAL, AUTO_TOLERANCE, CATEGORIES, Category,
    FALLBACK_GROUP, FALLBACK_INTERVAL, LOCAL_COUNTRY, LOCAL_GROUP, LOCAL_PROVIDERS, MAIN_GROUP,
    PRIVATE_CIDRS, QUIC_EXPRESSION, QUIC_SHORTCUT, category, icon,
};

/// Knobs for the generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizerOptions {
    /// Probe URL for url-test/fallback groups and per-proxy benchmarks
    pub health_check_url: String,
    pub mode: Mode,
    pub log_level: LogLevel,
    /// Category keys to emit; empty means all
    pub categories: Vec<String>,
}

impl Default for SynthesizerOptions {
    fn default() -> Self {
        Self {
            health_check_url: templates::HEALTH_CHECK_URL.to_string(),
            mode: Mode::default(),
            log_level: LogLevel::default(),
            categories: Vec::new(),
        }
    }
}

/// Turns named records into a [`StashConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigSynthesizer {
    options: SynthesizerOptions,
}

impl ConfigSynthesizer {
    pub fn new(options: SynthesizerOptions) -> Self {
        Self { options }
    }

    /// Categories selected by the options, in template order. Unknown keys
    /// are ignored here; the generator config rejects them at load time.
    pub fn categories(&self) -> Vec<&'static Category> {
        if self.options.categories.is_empty() {
            return CATEGORIES.iter().collect();
        }
        CATEGORIES
            .iter()
            .filter(|c| self.options.categories.iter().any(|k| k == c.key))
            .collect()
    }

    /// Names no proxy may take: every emitted group plus `DIRECT`/`REJECT`.
    pub fn reserved_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [MAIN_GROUP, AUTO_GROUP, FALLBACK_GROUP, LOCAL_GROUP]
            .iter()
            .map(|s| s.to_string())
            .collect();
        names.extend(self.categories().iter().map(|c| c.group.to_string()));
        names.push(ADBLOCK_GROUP.to_string());
        names.push(DIRECT.to_string());
        names.push(REJECT.to_string());
        names
    }

    /// Builds and checks the document.
    ///
    /// Records must already be deduplicated and uniquely named.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError`] if the assembled document is not
    /// referentially consistent.
    pub fn synthesize(&self, records: &[ProxyRecord]) -> Result<StashConfig, IntegrityError> {
        let categories = self.categories();
        let proxy_names: Vec<String> = records.iter().map(|r| r.display_name.clone()).collect();

        let proxies = records
            .iter()
            .map(|r| proxy::proxy_entry(r, &self.options.health_check_url))
            .collect();
        let proxy_groups = self.build_groups(&proxy_names, &categories);
        let rules = build_rules(&categories);
        let rule_providers = build_providers(&categories, &rules);

        debug!(
            "Synthesized {} proxies, {} groups, {} providers, {} rules",
            proxy_names.len(),
            proxy_groups.len(),
            rule_providers.len(),
            rules.len()
        );

        let config = StashConfig {
            mode: self.options.mode,
            log_level: self.options.log_level,
            dns: templates::dns(),
            script: Some(Script::with_shortcut(QUIC_SHORTCUT, QUIC_EXPRESSION)),
            proxies,
            proxy_groups,
            rule_providers,
            rules,
        };

        config.validate().into_result()?;
        info!(
            "Config synthesized with {} proxies and {} category groups",
            config.proxies.len(),
            categories.len()
        );
        Ok(config)
    }

    fn build_groups(&self, proxy_names: &[String], categories: &[&Category]) -> Vec<ProxyGroup> {
        let url = &self.options.health_check_url;

        let mut main_members = vec![
            AUTO_GROUP.to_string(),
            FALLBACK_GROUP.to_string(),
            DIRECT.to_string(),
        ];
        main_members.extend_from_slice(proxy_names);

        let mut groups = vec![
            ProxyGroup::select(MAIN_GROUP, main_members).with_icon(icon("Proxy.png")),
            ProxyGroup::url_test(
                AUTO_GROUP,
                url.as_str(),
                AUTO_INTERVAL,
                AUTO_TOLERANCE,
                proxy_names.to_vec(),
            )
            .with_icon(icon("Auto.png")),
            ProxyGroup::fallback(
                FALLBACK_GROUP,
                url.as_str(),
                FALLBACK_INTERVAL,
                proxy_names.to_vec(),
            )
            .with_icon(icon("Available.png")),
            ProxyGroup::select(LOCAL_GROUP, vec![DIRECT.to_string(), MAIN_GROUP.to_string()])
                .with_icon(icon("Iran.png")),
        ];

        groups.extend(
            categories
                .iter()
                .map(|c| ProxyGroup::select(c.group, c.menu.members()).with_icon(icon(c.icon))),
        );

        groups.push(
            ProxyGroup::select(ADBLOCK_GROUP, vec![REJECT.to_string(), DIRECT.to_string()])
                .with_icon(icon("Advertising.png")),
        );

        groups
    }
}

/// Rule list, first match wins:
/// QUIC reject, ads, categories, private ranges, local region, catch-all.
fn build_rules(categories: &[&Category]) -> Vec<Rule> {
    let local = || Target::group(LOCAL_GROUP);
    let mut rules = vec![
        Rule::script(QUIC_SHORTCUT, Target::Reject),
        Rule::rule_set(ADS_PROVIDER, Target::group(ADBLOCK_GROUP)),
    ];

    for c in categories {
        let target = Target::group(c.group);
        rules.push(match c.source {
            templates::CategorySource::RegionalCidr { provider, .. } => {
                Rule::rule_set_no_resolve(provider, target.clone())
            }
            templates::CategorySource::Classical { provider, .. } => {
                Rule::rule_set(provider, target.clone())
            }
        });
        rules.extend(
            c.domain_suffixes
                .iter()
                .map(|suffix| Rule::domain_suffix(*suffix, target.clone())),
        );
    }

    rules.extend(PRIVATE_CIDRS.iter().map(|cidr| Rule::ip_cidr(*cidr, local())));

    for (provider, no_resolve) in LOCAL_PROVIDERS {
        rules.push(if *no_resolve {
            Rule::rule_set_no_resolve(*provider, local())
        } else {
            Rule::rule_set(*provider, local())
        });
    }
    rules.push(Rule::geoip(LOCAL_COUNTRY, local()));

    rules.push(Rule::catch_all(Target::group(MAIN_GROUP)));
    rules
}

/// Providers referenced by `rules`: regional first, then categories.
fn build_providers(categories: &[&Category], rules: &[Rule]) -> LinkedHashMap<String, RuleProvider> {
    let catalog = templates::base_providers().into_iter().chain(
        categories
            .iter()
            .map(|c| (c.source.provider_name(), c.source.rule_provider())),
    );

    catalog
        .filter(|(name, _)| rules.iter().any(|r| r.provider() == Some(*name)))
        .map(|(name, provider)| (name.to_string(), provider))
        .collect()
}

/// Looks up a category key; used by config validation.
pub fn is_known_category(key: &str) -> bool {
    category(key).is_some()
}

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};

use crate::config::dns::Dns;
use crate::config::group::ProxyGroup;
use crate::config::proxy::VlessProxy;
use crate::config::rule::Rule;
use crate::config::rule_provider::RuleProvider;

pub mod dns;
pub mod group;
pub mod proxy;
pub mod rule;
pub mod rule_provider;
pub mod util;
pub mod validation;

/// Client routing mode.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Rule,
    Global,
    Direct,
}

/// Client log level.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Silent,
}

/// Named boolean expressions usable from `SCRIPT` rules.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct Script {
    #[serde(default)]
    pub shortcuts: LinkedHashMap<String, String>,
}

impl Script {
    pub fn with_shortcut(name: impl Into<String>, expression: impl Into<String>) -> Self {
        let mut shortcuts = LinkedHashMap::new();
        shortcuts.insert(name.into(), expression.into());
        Self { shortcuts }
    }
}

/// Stash configuration document
///
/// Field order is the section order of the emitted YAML. The serializer
/// keeps struct order, so nothing here is ever alphabetized.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct StashConfig {
    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub dns: Dns,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,

    #[serde(default)]
    pub proxies: Vec<VlessProxy>,

    #[serde(default)]
    pub proxy_groups: Vec<ProxyGroup>,

    /// Provider name -> descriptor, in emission order
    #[serde(default)]
    pub rule_providers: LinkedHashMap<String, RuleProvider>,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl StashConfig {
    /// Serialize the configuration to a block-style YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Deserialize a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Names of every proxy, in document order.
    pub fn proxy_names(&self) -> Vec<&str> {
        self.proxies.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn group(&self, name: &str) -> Option<&ProxyGroup> {
        self.proxy_groups.iter().find(|g| g.name == name)
    }
}

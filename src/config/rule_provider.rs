//! Remote rule providers.

use serde::{Deserialize, Serialize};

/// What a provider's entries match against.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Domain,
    Ipcidr,
    Classical,
}

/// On-wire format of the provider file.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFormat {
    Text,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Http,
}

/// A periodically refreshed remote rule list.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RuleProvider {
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,

    pub behavior: Behavior,

    /// Omitted for YAML payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ProviderFormat>,

    pub url: String,

    /// Refresh interval in seconds
    pub interval: u32,
}

impl RuleProvider {
    pub fn http(behavior: Behavior, url: impl Into<String>, interval: u32) -> Self {
        Self {
            provider_type: ProviderType::Http,
            behavior,
            format: None,
            url: url.into(),
            interval,
        }
    }

    pub fn with_format(mut self, format: ProviderFormat) -> Self {
        self.format = Some(format);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_provider_keys() {
        let provider =
            RuleProvider::http(Behavior::Ipcidr, "https://x/ircidr.txt", 86400)
                .with_format(ProviderFormat::Text);
        let yaml = serde_yaml::to_string(&provider).unwrap();
        let keys: Vec<&str> = yaml
            .lines()
            .filter_map(|line| line.split(':').next())
            .collect();
        assert_eq!(keys, vec!["type", "behavior", "format", "url", "interval"]);
        assert!(yaml.contains("format: text"));
    }

    #[test]
    fn test_classical_provider_omits_format() {
        let provider = RuleProvider::http(Behavior::Classical, "https://x/Steam.yaml", 86400);
        let yaml = serde_yaml::to_string(&provider).unwrap();
        assert!(yaml.contains("behavior: classical"));
        assert!(!yaml.contains("format"));
    }
}

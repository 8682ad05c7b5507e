//! Proxy groups.

use serde::{Deserialize, Serialize};

/// Selection strategy of a proxy group.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    /// Manual selection
    Select,
    /// Lowest measured latency
    UrlTest,
    /// First healthy member in order
    Fallback,
}

/// A named proxy group. Members are proxy names, group names or
/// `DIRECT`/`REJECT`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProxyGroup {
    pub name: String,

    #[serde(rename = "type")]
    pub group_type: GroupType,

    /// Health check URL (url-test and fallback)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Health check interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,

    /// Latency difference in ms before switching (url-test)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,

    /// Only test while the group is in use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,

    #[serde(default)]
    pub proxies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ProxyGroup {
    /// Manual selector over `proxies`.
    pub fn select(name: impl Into<String>, proxies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            group_type: GroupType::Select,
            url: None,
            interval: None,
            tolerance: None,
            lazy: None,
            proxies,
            icon: None,
        }
    }

    /// Latency-based auto selection.
    pub fn url_test(
        name: impl Into<String>,
        url: impl Into<String>,
        interval: u32,
        tolerance: u32,
        proxies: Vec<String>,
    ) -> Self {
        Self {
            group_type: GroupType::UrlTest,
            url: Some(url.into()),
            interval: Some(interval),
            tolerance: Some(tolerance),
            lazy: Some(true),
            ..Self::select(name, proxies)
        }
    }

    /// Ordered fallback.
    pub fn fallback(
        name: impl Into<String>,
        url: impl Into<String>,
        interval: u32,
        proxies: Vec<String>,
    ) -> Self {
        Self {
            group_type: GroupType::Fallback,
            url: Some(url.into()),
            interval: Some(interval),
            ..Self::select(name, proxies)
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_key_order() {
        let group = ProxyGroup::select("G", vec!["DIRECT".to_string()]).with_icon("i.png");
        let yaml = serde_yaml::to_string(&group).unwrap();
        assert_eq!(
            yaml,
            "name: G\ntype: select\nproxies:\n- DIRECT\nicon: i.png\n"
        );
    }

    #[test]
    fn test_url_test_fields() {
        let group = ProxyGroup::url_test("Auto", "http://probe", 180, 80, vec!["a".to_string()]);
        let yaml = serde_yaml::to_string(&group).unwrap();
        assert!(yaml.contains("type: url-test"));
        assert!(yaml.contains("http://probe"));
        assert!(yaml.contains("interval: 180"));
        assert!(yaml.contains("tolerance: 80"));
        assert!(yaml.contains("lazy: true"));
        assert_eq!(group.group_type, GroupType::UrlTest);
    }

    #[test]
    fn test_fallback_has_no_tolerance() {
        let group = ProxyGroup::fallback("F", "http://probe", 120, vec![]);
        assert_eq!(group.group_type, GroupType::Fallback);
        assert_eq!(group.interval, Some(120));
        assert!(group.tolerance.is_none());
        assert!(group.lazy.is_none());
    }

    #[test]
    fn test_group_deserialize() {
        let yaml = "name: X\ntype: fallback\nurl: http://u\ninterval: 60\nproxies: [a, b]\n";
        let group: ProxyGroup = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(group.group_type, GroupType::Fallback);
        assert_eq!(group.proxies, vec!["a", "b"]);
    }
}

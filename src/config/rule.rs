//! Routing rules.
//!
//! Rules are typed in memory and rendered to the client's one-line form
//! (`TYPE,payload,target[,option]`) when serialized. Rules are evaluated
//! top to bottom, first match wins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::util::{DIRECT, REJECT};

/// Where matched traffic goes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Direct,
    Reject,
    /// A proxy group or proxy, by name
    Group(String),
}

impl Target {
    pub fn group(name: impl Into<String>) -> Self {
        Target::Group(name.into())
    }

    /// Name that must be defined in the document, if any.
    pub fn referenced_name(&self) -> Option<&str> {
        match self {
            Target::Group(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Direct => write!(f, "{}", DIRECT),
            Target::Reject => write!(f, "{}", REJECT),
            Target::Group(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        match s {
            DIRECT => Target::Direct,
            REJECT => Target::Reject,
            other => Target::Group(other.to_string()),
        }
    }
}

/// A single routing rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Matches a named script shortcut
    Script {
        shortcut: String,
        target: Target,
        no_track: bool,
    },
    /// Matches entries of a rule provider
    RuleSet {
        provider: String,
        target: Target,
        no_resolve: bool,
    },
    DomainSuffix {
        suffix: String,
        target: Target,
    },
    IpCidr {
        cidr: String,
        target: Target,
        no_resolve: bool,
    },
    GeoIp {
        country: String,
        target: Target,
        no_resolve: bool,
    },
    /// Catch-all
    Match {
        target: Target,
    },
}

impl Rule {
    pub fn script(shortcut: impl Into<String>, target: Target) -> Self {
        Rule::Script {
            shortcut: shortcut.into(),
            target,
            no_track: true,
        }
    }

    pub fn rule_set(provider: impl Into<String>, target: Target) -> Self {
        Rule::RuleSet {
            provider: provider.into(),
            target,
            no_resolve: false,
        }
    }

    /// Rule-set match on IP lists; skips resolving domain requests.
    pub fn rule_set_no_resolve(provider: impl Into<String>, target: Target) -> Self {
        Rule::RuleSet {
            provider: provider.into(),
            target,
            no_resolve: true,
        }
    }

    pub fn domain_suffix(suffix: impl Into<String>, target: Target) -> Self {
        Rule::DomainSuffix {
            suffix: suffix.into(),
            target,
        }
    }

    pub fn ip_cidr(cidr: impl Into<String>, target: Target) -> Self {
        Rule::IpCidr {
            cidr: cidr.into(),
            target,
            no_resolve: true,
        }
    }

    pub fn geoip(country: impl Into<String>, target: Target) -> Self {
        Rule::GeoIp {
            country: country.into(),
            target,
            no_resolve: true,
        }
    }

    pub fn catch_all(target: Target) -> Self {
        Rule::Match { target }
    }

    pub fn target(&self) -> &Target {
        match self {
            Rule::Script { target, .. }
            | Rule::RuleSet { target, .. }
            | Rule::DomainSuffix { target, .. }
            | Rule::IpCidr { target, .. }
            | Rule::GeoIp { target, .. }
            | Rule::Match { target } => target,
        }
    }

    /// Rule provider this rule reads from.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Rule::RuleSet { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Script shortcut this rule evaluates.
    pub fn shortcut(&self) -> Option<&str> {
        match self {
            Rule::Script { shortcut, .. } => Some(shortcut),
            _ => None,
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self, Rule::Match { .. })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, payload, target, option) = match self {
            Rule::Script {
                shortcut,
                target,
                no_track,
            } => ("SCRIPT", Some(shortcut), target, no_track.then_some("no-track")),
            Rule::RuleSet {
                provider,
                target,
                no_resolve,
            } => (
                "RULE-SET",
                Some(provider),
                target,
                no_resolve.then_some("no-resolve"),
            ),
            Rule::DomainSuffix { suffix, target } => ("DOMAIN-SUFFIX", Some(suffix), target, None),
            Rule::IpCidr {
                cidr,
                target,
                no_resolve,
            } => ("IP-CIDR", Some(cidr), target, no_resolve.then_some("no-resolve")),
            Rule::GeoIp {
                country,
                target,
                no_resolve,
            } => ("GEOIP", Some(country), target, no_resolve.then_some("no-resolve")),
            Rule::Match { target } => ("MATCH", None, target, None),
        };

        write!(f, "{}", kind)?;
        if let Some(payload) = payload {
            write!(f, ",{}", payload)?;
        }
        write!(f, ",{}", target)?;
        if let Some(option) = option {
            write!(f, ",{}", option)?;
        }
        Ok(())
    }
}

/// Error returned when a rule line cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule '{line}': {reason}")]
pub struct RuleParseError {
    pub line: String,
    pub reason: &'static str,
}

impl FromStr for Rule {
    type Err = RuleParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let err = |reason| RuleParseError {
            line: line.to_string(),
            reason,
        };
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let kind = parts[0];

        if kind == "MATCH" {
            return match parts.as_slice() {
                [_, target] => Ok(Rule::catch_all(Target::from(*target))),
                _ => Err(err("MATCH takes exactly one target")),
            };
        }

        let (payload, target, option) = match parts.as_slice() {
            [_, payload, target] => (payload.to_string(), Target::from(*target), None),
            [_, payload, target, option] => {
                (payload.to_string(), Target::from(*target), Some(*option))
            }
            _ => return Err(err("expected TYPE,payload,target[,option]")),
        };
        let no_resolve = option == Some("no-resolve");
        if option.is_some_and(|o| o != "no-resolve" && o != "no-track") {
            return Err(err("unknown rule option"));
        }

        match kind {
            "SCRIPT" => Ok(Rule::Script {
                shortcut: payload,
                target,
                no_track: option == Some("no-track"),
            }),
            "RULE-SET" => Ok(Rule::RuleSet {
                provider: payload,
                target,
                no_resolve,
            }),
            "DOMAIN-SUFFIX" => Ok(Rule::DomainSuffix {
                suffix: payload,
                target,
            }),
            "IP-CIDR" => Ok(Rule::IpCidr {
                cidr: payload,
                target,
                no_resolve,
            }),
            "GEOIP" => Ok(Rule::GeoIp {
                country: payload,
                target,
                no_resolve,
            }),
            _ => Err(err("unsupported rule type")),
        }
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let line = String::deserialize(deserializer)?;
        line.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(
            Rule::script("quic", Target::Reject).to_string(),
            "SCRIPT,quic,REJECT,no-track"
        );
        assert_eq!(
            Rule::rule_set("ads", Target::group("🚫 Ad Block")).to_string(),
            "RULE-SET,ads,🚫 Ad Block"
        );
        assert_eq!(
            Rule::rule_set_no_resolve("iran-cidr", Target::group("🇮🇷 Iran Direct")).to_string(),
            "RULE-SET,iran-cidr,🇮🇷 Iran Direct,no-resolve"
        );
        assert_eq!(
            Rule::domain_suffix("t.me", Target::group("✈️ Telegram")).to_string(),
            "DOMAIN-SUFFIX,t.me,✈️ Telegram"
        );
        assert_eq!(
            Rule::ip_cidr("10.0.0.0/8", Target::Direct).to_string(),
            "IP-CIDR,10.0.0.0/8,DIRECT,no-resolve"
        );
        assert_eq!(
            Rule::geoip("IR", Target::Direct).to_string(),
            "GEOIP,IR,DIRECT,no-resolve"
        );
        assert_eq!(
            Rule::catch_all(Target::group("🚀 Main Proxy")).to_string(),
            "MATCH,🚀 Main Proxy"
        );
    }

    #[test]
    fn test_parse_roundtrip_forms() {
        for line in [
            "SCRIPT,quic,REJECT,no-track",
            "RULE-SET,telegram-cidr,✈️ Telegram,no-resolve",
            "DOMAIN-SUFFIX,telegram.org,✈️ Telegram",
            "IP-CIDR,100.64.0.0/10,DIRECT,no-resolve",
            "GEOIP,IR,🇮🇷 Iran Direct,no-resolve",
            "MATCH,🚀 Main Proxy",
        ] {
            let rule: Rule = line.parse().unwrap();
            assert_eq!(rule.to_string(), line);
        }
    }

    #[test]
    fn test_parse_targets() {
        let rule: Rule = "RULE-SET,ads,REJECT".parse().unwrap();
        assert_eq!(rule.target(), &Target::Reject);
        assert_eq!(rule.provider(), Some("ads"));
        assert_eq!(rule.target().referenced_name(), None);

        let rule: Rule = "MATCH,Final".parse().unwrap();
        assert!(rule.is_catch_all());
        assert_eq!(rule.target().referenced_name(), Some("Final"));
    }

    #[test]
    fn test_parse_errors() {
        assert!("MATCH".parse::<Rule>().is_err());
        assert!("MATCH,a,b".parse::<Rule>().is_err());
        assert!("DOMAIN-SUFFIX,x.com".parse::<Rule>().is_err());
        assert!("PROCESS-NAME,curl,DIRECT".parse::<Rule>().is_err());
        assert!("IP-CIDR,1.0.0.0/8,DIRECT,bogus".parse::<Rule>().is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let rules = vec![
            Rule::rule_set("ads", Target::Reject),
            Rule::catch_all(Target::Direct),
        ];
        let yaml = serde_yaml::to_string(&rules).unwrap();
        assert_eq!(yaml, "- RULE-SET,ads,REJECT\n- MATCH,DIRECT\n");

        let parsed: Vec<Rule> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, rules);
    }
}

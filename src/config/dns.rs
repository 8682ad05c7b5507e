//! DNS section of the client config.

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// DNS configuration.
///
/// `nameserver-policy` keeps insertion order so more specific patterns
/// written first stay first in the emitted document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Dns {
    /// Plain resolvers used to bootstrap DoH hostnames
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_nameserver: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameserver: Vec<String>,

    /// Domain pattern -> resolver
    #[serde(default, skip_serializing_if = "LinkedHashMap::is_empty")]
    pub nameserver_policy: LinkedHashMap<String, String>,

    /// Domains that must resolve to real addresses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fake_ip_filter: Vec<String>,
}

impl Dns {
    /// Routes every pattern in `domains` to `server`.
    pub fn add_policy<I, S>(&mut self, domains: I, server: &str)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for domain in domains {
            self.nameserver_policy
                .insert(domain.into(), server.to_string());
        }
    }
}

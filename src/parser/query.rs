//! Typed view of the query string of a VLESS link.
//!
//! Only the keys the parser understands are kept. The raw key/value pairs
//! never leave this module.

use url::form_urlencoded;

/// Query parameters of a `vless://` link, first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub security: Option<String>,
    pub sni: Option<String>,
    pub public_key: Option<String>,
    pub short_id: Option<String>,
    pub fingerprint: Option<String>,
    pub flow: Option<String>,
    pub alpn: Option<String>,
    pub allow_insecure: Option<String>,
    pub network: Option<String>,
    pub header_type: Option<String>,
    pub path: Option<String>,
    pub host: Option<String>,
    pub service_name: Option<String>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let mut params = QueryParams::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "security" => &mut params.security,
                "sni" | "peer" => &mut params.sni,
                "pbk" | "publicKey" => &mut params.public_key,
                "sid" | "shortId" => &mut params.short_id,
                "fp" | "fingerprint" => &mut params.fingerprint,
                "flow" => &mut params.flow,
                "alpn" => &mut params.alpn,
                "allowInsecure" | "insecure" => &mut params.allow_insecure,
                "type" | "net" => &mut params.network,
                "headerType" => &mut params.header_type,
                "path" => &mut params.path,
                "host" => &mut params.host,
                "serviceName" => &mut params.service_name,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.trim().to_string());
            }
        }
        params
    }

    /// Returns the value only if present and non-empty.
    pub fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_insecure(&self) -> bool {
        matches!(
            Self::non_empty(&self.allow_insecure).map(str::to_ascii_lowercase).as_deref(),
            Some("1" | "true")
        )
    }

    pub fn alpn_list(&self) -> Vec<String> {
        Self::non_empty(&self.alpn)
            .map(|alpn| {
                alpn.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        let params = QueryParams::parse(
            "security=reality&pbk=KEY&sid=ab12&sni=example.com&fp=chrome&type=tcp&flow=xtls-rprx-vision",
        );
        assert_eq!(params.security.as_deref(), Some("reality"));
        assert_eq!(params.public_key.as_deref(), Some("KEY"));
        assert_eq!(params.short_id.as_deref(), Some("ab12"));
        assert_eq!(params.sni.as_deref(), Some("example.com"));
        assert_eq!(params.fingerprint.as_deref(), Some("chrome"));
        assert_eq!(params.network.as_deref(), Some("tcp"));
        assert_eq!(params.flow.as_deref(), Some("xtls-rprx-vision"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let params = QueryParams::parse("sni=first.com&sni=second.com");
        assert_eq!(params.sni.as_deref(), Some("first.com"));
    }

    #[test]
    fn test_percent_decoding() {
        let params = QueryParams::parse("path=%2Fws%3Fed%3D2048&host=cdn.example.com");
        assert_eq!(params.path.as_deref(), Some("/ws?ed=2048"));
        assert_eq!(params.host.as_deref(), Some("cdn.example.com"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let params = QueryParams::parse("encryption=none&spx=%2F&foo=bar");
        assert_eq!(params, QueryParams::default());
    }

    #[test]
    fn test_alpn_list() {
        let params = QueryParams::parse("alpn=h2,%20http/1.1,,");
        assert_eq!(params.alpn_list(), vec!["h2", "http/1.1"]);
        assert!(QueryParams::default().alpn_list().is_empty());
    }

    #[test]
    fn test_is_insecure() {
        assert!(QueryParams::parse("allowInsecure=1").is_insecure());
        assert!(QueryParams::parse("insecure=true").is_insecure());
        assert!(!QueryParams::parse("allowInsecure=0").is_insecure());
        assert!(!QueryParams::default().is_insecure());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(QueryParams::non_empty(&Some(String::new())), None);
        assert_eq!(QueryParams::non_empty(&None), None);
        assert_eq!(QueryParams::non_empty(&Some("x".into())), Some("x"));
    }
}

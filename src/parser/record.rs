//! Normalized proxy record produced by the link parser.

use std::fmt;

/// Transport carried underneath the VLESS session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Tcp,
    Ws,
    Grpc,
    Http,
}

impl Transport {
    /// Value used for the `network` key of a proxy entry.
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
            Transport::Ws => "ws",
            Transport::Grpc => "grpc",
            Transport::Http => "http",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Security layer negotiated on top of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityMode {
    #[default]
    None,
    Tls,
    Reality,
}

impl SecurityMode {
    /// Maps a `security=` query value. Unknown values count as `None`.
    pub fn from_query(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "reality" => SecurityMode::Reality,
            "tls" => SecurityMode::Tls,
            _ => SecurityMode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityMode::None => "none",
            SecurityMode::Tls => "tls",
            SecurityMode::Reality => "reality",
        }
    }

    pub fn is_tls(self) -> bool {
        !matches!(self, SecurityMode::None)
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TLS handshake parameters, shared by `tls` and `reality` modes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TlsParams {
    pub server_name: Option<String>,
    pub alpn: Vec<String>,
    /// Always a member of the fingerprint whitelist.
    pub fingerprint: String,
    pub skip_cert_verify: bool,
}

/// REALITY parameters. `public_key` is never empty; `short_id` may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealityParams {
    pub public_key: String,
    pub short_id: String,
}

/// Transport-specific options. Fields unrelated to the active transport stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportParams {
    pub path: Option<String>,
    pub host: Option<String>,
    pub service_name: Option<String>,
}

/// A validated proxy endpoint.
///
/// Created by the link parser; only [`display_name`](Self::display_name) is
/// touched afterwards, by the name resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRecord {
    pub display_name: String,
    pub host: String,
    pub port: u16,
    pub identity: String,
    pub transport: Transport,
    pub security: SecurityMode,
    pub tls: Option<TlsParams>,
    pub reality: Option<RealityParams>,
    pub flow: Option<String>,
    pub transport_params: TransportParams,
}

/// Lower-cased `(host, port, identity)` triple naming one physical endpoint.
pub type IdentityKey = (String, u16, String);

impl ProxyRecord {
    pub fn identity_key(&self) -> IdentityKey {
        (
            self.host.to_lowercase(),
            self.port,
            self.identity.to_lowercase(),
        )
    }

    /// `host:port`, with IPv6 literals bracketed.
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(host: &str, identity: &str) -> ProxyRecord {
        ProxyRecord {
            display_name: "node".to_string(),
            host: host.to_string(),
            port: 443,
            identity: identity.to_string(),
            transport: Transport::Tcp,
            security: SecurityMode::None,
            tls: None,
            reality: None,
            flow: None,
            transport_params: TransportParams::default(),
        }
    }

    #[test]
    fn test_security_mode_from_query() {
        assert_eq!(SecurityMode::from_query("reality"), SecurityMode::Reality);
        assert_eq!(SecurityMode::from_query("REALITY"), SecurityMode::Reality);
        assert_eq!(SecurityMode::from_query("tls"), SecurityMode::Tls);
        assert_eq!(SecurityMode::from_query("none"), SecurityMode::None);
        assert_eq!(SecurityMode::from_query("xtls"), SecurityMode::None);
        assert_eq!(SecurityMode::from_query(""), SecurityMode::None);
    }

    #[test]
    fn test_identity_key_is_case_insensitive() {
        let a = record("Example.COM", "AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE");
        let b = record("example.com", "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee");
        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_endpoint_brackets_ipv6() {
        assert_eq!(record("2001:db8::1", "x").endpoint(), "[2001:db8::1]:443");
        assert_eq!(record("1.2.3.4", "x").endpoint(), "1.2.3.4:443");
    }

    #[test]
    fn test_transport_names() {
        assert_eq!(Transport::Tcp.to_string(), "tcp");
        assert_eq!(Transport::Ws.to_string(), "ws");
        assert_eq!(Transport::Grpc.to_string(), "grpc");
        assert_eq!(Transport::Http.to_string(), "http");
    }
}

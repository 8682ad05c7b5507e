use thiserror::Error;

/// Why a single link line was rejected. Never fatal to the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("line does not start with vless://")]
    MissingScheme,
    #[error("link has no user info (identity)")]
    MissingIdentity,
    #[error("identity '{0}' is not a UUID")]
    InvalidIdentity(String),
    #[error("invalid host '{0}'")]
    InvalidHost(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
    #[error("security '{0}' is not allowed, reality is required")]
    SecurityNotAllowed(String),
    #[error("reality link has no public key (pbk)")]
    MissingPublicKey,
    #[error("reality link has no server name (sni)")]
    MissingServerName,
    #[error("unsupported flow '{0}'")]
    UnsupportedFlow(String),
    #[error("unsupported transport '{0}'")]
    UnsupportedTransport(String),
}

impl RejectReason {
    /// Stable short label, used as the key of per-reason counters.
    pub fn kind(&self) -> &'static str {
        match self {
            RejectReason::MissingScheme => "missing-scheme",
            RejectReason::MissingIdentity => "missing-identity",
            RejectReason::InvalidIdentity(_) => "invalid-identity",
            RejectReason::InvalidHost(_) => "invalid-host",
            RejectReason::InvalidPort(_) => "invalid-port",
            RejectReason::SecurityNotAllowed(_) => "security-not-allowed",
            RejectReason::MissingPublicKey => "missing-public-key",
            RejectReason::MissingServerName => "missing-server-name",
            RejectReason::UnsupportedFlow(_) => "unsupported-flow",
            RejectReason::UnsupportedTransport(_) => "unsupported-transport",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_offending_value() {
        let reason = RejectReason::InvalidPort("65536".to_string());
        assert_eq!(reason.to_string(), "invalid port '65536'");
    }

    #[test]
    fn test_kind_ignores_payload() {
        assert_eq!(
            RejectReason::UnsupportedFlow("a".into()).kind(),
            RejectReason::UnsupportedFlow("b".into()).kind()
        );
    }

    #[test]
    fn test_every_kind_is_distinct() {
        let reasons = [
            RejectReason::MissingScheme,
            RejectReason::MissingIdentity,
            RejectReason::InvalidIdentity(String::new()),
            RejectReason::InvalidHost(String::new()),
            RejectReason::InvalidPort(String::new()),
            RejectReason::SecurityNotAllowed(String::new()),
            RejectReason::MissingPublicKey,
            RejectReason::MissingServerName,
            RejectReason::UnsupportedFlow(String::new()),
            RejectReason::UnsupportedTransport(String::new()),
        ];
        let kinds: std::collections::HashSet<&str> = reasons.iter().map(|r| r.kind()).collect();
        assert_eq!(kinds.len(), reasons.len());
    }
}

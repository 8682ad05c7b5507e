//! VLESS link parser
//!
//! Format: `vless://uuid@host:port?params#name`

use std::sync::Arc;

use tracing::{debug, trace};

use super::host::parse_host_port;
use super::query::QueryParams;
use super::record::{
    ProxyRecord, RealityParams, SecurityMode, TlsParams, Transport, TransportParams,
};
use super::{FlowPolicy, LinkParser, ParsePolicy, RejectReason};
use crate::random::{RandomSource, ThreadRandom};

/// uTLS fingerprints the client understands.
pub const VALID_FINGERPRINTS: &[&str] = &[
    "chrome",
    "firefox",
    "safari",
    "ios",
    "android",
    "edge",
    "360",
    "qq",
    "random",
    "randomized",
];

/// Fingerprint used when the link has none or an unknown one.
pub const DEFAULT_FINGERPRINT: &str = "chrome";

/// XTLS flows the client understands.
pub const VALID_FLOWS: &[&str] = &[
    "xtls-rprx-origin",
    "xtls-rprx-direct",
    "xtls-rprx-splice",
    "xtls-rprx-vision",
    "xtls-rprx-vision-udp443",
];

/// Length of the random suffix in generated placeholder names.
const PLACEHOLDER_SUFFIX_LEN: usize = 6;

// ============================================================================
// VLESS Parser
// ============================================================================

/// Parser for `vless://` links.
pub struct VLessParser {
    policy: ParsePolicy,
    random: Arc<dyn RandomSource>,
}

impl VLessParser {
    pub fn new(policy: ParsePolicy) -> Self {
        Self::with_random(policy, Arc::new(ThreadRandom))
    }

    pub fn with_random(policy: ParsePolicy, random: Arc<dyn RandomSource>) -> Self {
        Self { policy, random }
    }
}

impl Default for VLessParser {
    fn default() -> Self {
        Self::new(ParsePolicy::default())
    }
}

impl LinkParser for VLessParser {
    fn scheme(&self) -> &str {
        "vless"
    }

    fn parse(&self, line: &str) -> Result<ProxyRecord, RejectReason> {
        let line = line.trim();
        let rest = line
            .strip_prefix("vless://")
            .ok_or(RejectReason::MissingScheme)?;
        trace!("Parsing VLESS link");

        // Fragment first: a '#' inside the name must not be taken for a query or path
        let (rest, remark) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, decode_remark(fragment)),
            None => (rest, None),
        };
        let (rest, query) = rest.split_once('?').unwrap_or((rest, ""));
        let authority = rest.split('/').next().unwrap_or(rest);

        let (userinfo, hostport) = authority
            .split_once('@')
            .ok_or(RejectReason::MissingIdentity)?;
        let identity = normalize_identity(userinfo)?;
        let (host, port) = parse_host_port(hostport)?;

        let params = QueryParams::parse(query);

        let security = params
            .security
            .as_deref()
            .map(SecurityMode::from_query)
            .unwrap_or_default();
        if self.policy.require_reality && security != SecurityMode::Reality {
            return Err(RejectReason::SecurityNotAllowed(
                QueryParams::non_empty(&params.security)
                    .unwrap_or("none")
                    .to_string(),
            ));
        }

        let (tls, reality) = build_security(security, &params)?;
        let flow = self.extract_flow(&params)?;
        let (transport, transport_params) = build_transport(&params)?;

        let display_name = remark.unwrap_or_else(|| self.placeholder_name(security));

        let record = ProxyRecord {
            display_name,
            host,
            port,
            identity,
            transport,
            security,
            tls,
            reality,
            flow,
            transport_params,
        };
        debug!(
            "Parsed VLESS link '{}' -> {} ({}/{})",
            record.display_name,
            record.endpoint(),
            record.transport,
            record.security
        );
        Ok(record)
    }
}

impl VLessParser {
    fn extract_flow(&self, params: &QueryParams) -> Result<Option<String>, RejectReason> {
        let Some(flow) = QueryParams::non_empty(&params.flow) else {
            return Ok(None);
        };
        let flow = flow.to_ascii_lowercase();
        if VALID_FLOWS.contains(&flow.as_str()) {
            return Ok(Some(flow));
        }
        match self.policy.flow_policy {
            FlowPolicy::Reject => Err(RejectReason::UnsupportedFlow(flow)),
            FlowPolicy::Clear => {
                debug!("Clearing unsupported flow '{}'", flow);
                Ok(None)
            }
        }
    }

    fn placeholder_name(&self, security: SecurityMode) -> String {
        let prefix = match security {
            SecurityMode::Reality => "Reality",
            _ => "VLESS",
        };
        format!("{}-{}", prefix, self.random.hex(PLACEHOLDER_SUFFIX_LEN))
    }
}

// ============================================================================
// Field Extraction
// ============================================================================

fn decode_remark(fragment: &str) -> Option<String> {
    let decoded = urlencoding::decode(fragment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| fragment.to_string());
    let trimmed = decoded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Accepts `8-4-4-4-12` hex or 32 bare hex digits.
fn normalize_identity(userinfo: &str) -> Result<String, RejectReason> {
    let identity = urlencoding::decode(userinfo)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| userinfo.to_string());
    let identity = identity.trim();
    if identity.is_empty() {
        return Err(RejectReason::MissingIdentity);
    }
    if is_uuid(identity) {
        Ok(identity.to_string())
    } else {
        Err(RejectReason::InvalidIdentity(identity.to_string()))
    }
}

fn is_uuid(value: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    if value.len() == 32 {
        return value.bytes().all(|b| b.is_ascii_hexdigit());
    }
    let parts: Vec<&str> = value.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS)
            .all(|(part, len)| part.len() == len && part.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn normalize_fingerprint(value: Option<&str>) -> String {
    match value.map(str::to_ascii_lowercase) {
        Some(fp) if VALID_FINGERPRINTS.contains(&fp.as_str()) => fp,
        Some(fp) => {
            trace!(
                "Unknown fingerprint '{}', using '{}'",
                fp, DEFAULT_FINGERPRINT
            );
            DEFAULT_FINGERPRINT.to_string()
        }
        None => DEFAULT_FINGERPRINT.to_string(),
    }
}

fn build_security(
    security: SecurityMode,
    params: &QueryParams,
) -> Result<(Option<TlsParams>, Option<RealityParams>), RejectReason> {
    if !security.is_tls() {
        return Ok((None, None));
    }

    let server_name = QueryParams::non_empty(&params.sni).map(str::to_string);
    let tls = TlsParams {
        server_name: server_name.clone(),
        alpn: params.alpn_list(),
        fingerprint: normalize_fingerprint(QueryParams::non_empty(&params.fingerprint)),
        skip_cert_verify: params.is_insecure(),
    };

    if security != SecurityMode::Reality {
        return Ok((Some(tls), None));
    }

    let public_key = QueryParams::non_empty(&params.public_key)
        .ok_or(RejectReason::MissingPublicKey)?
        .to_string();
    if server_name.is_none() {
        return Err(RejectReason::MissingServerName);
    }
    let reality = RealityParams {
        public_key,
        short_id: params.short_id.clone().unwrap_or_default(),
    };
    Ok((Some(tls), Some(reality)))
}

fn build_transport(params: &QueryParams) -> Result<(Transport, TransportParams), RejectReason> {
    let network = QueryParams::non_empty(&params.network)
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "tcp".to_string());
    let header_type = QueryParams::non_empty(&params.header_type).map(str::to_ascii_lowercase);

    let transport = match network.as_str() {
        "tcp" | "raw" if header_type.as_deref() == Some("http") => Transport::Http,
        "tcp" | "raw" => Transport::Tcp,
        "ws" | "websocket" => Transport::Ws,
        "grpc" | "gun" => Transport::Grpc,
        "http" | "h2" => Transport::Http,
        other => return Err(RejectReason::UnsupportedTransport(other.to_string())),
    };

    let host = QueryParams::non_empty(&params.host).map(str::to_string);
    let transport_params = match transport {
        Transport::Tcp => TransportParams::default(),
        Transport::Ws | Transport::Http => TransportParams {
            path: Some(normalize_path(params.path.as_deref())),
            host,
            service_name: None,
        },
        Transport::Grpc => TransportParams {
            path: None,
            host: None,
            service_name: QueryParams::non_empty(&params.service_name).map(str::to_string),
        },
    };

    Ok((transport, transport_params))
}

/// Drops any embedded query (`/ws?ed=2048` -> `/ws`); empty becomes `/`.
fn normalize_path(path: Option<&str>) -> String {
    let path = path.unwrap_or_default();
    let path = path.split('?').next().unwrap_or_default().trim();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

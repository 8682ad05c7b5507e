//! Proxy entries of the client config.

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};

use crate::config::util::is_false;

/// Proxy protocol. Only VLESS is emitted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    #[default]
    Vless,
}

/// VLESS proxy entry. Field order is the key order of the emitted document.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct VlessProxy {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: ProxyKind,

    pub server: String,

    pub port: u16,

    pub uuid: String,

    /// tcp, ws, grpc or http
    pub network: String,

    /// Enables TLS (also required for REALITY)
    #[serde(default, skip_serializing_if = "is_false")]
    pub tls: bool,

    #[serde(default)]
    pub udp: bool,

    /// XTLS flow (e.g., "xtls-rprx-vision")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    /// TLS server name indication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_cert_verify: bool,

    /// uTLS fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reality_opts: Option<RealityOpts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<GrpcOpts>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_opts: Option<HttpOpts>,

    /// Latency test URL for this proxy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_url: Option<String>,

    /// Latency test timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_timeout: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RealityOpts {
    pub public_key: String,
    #[serde(default)]
    pub short_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct WsOpts {
    pub path: String,
    #[serde(default, skip_serializing_if = "LinkedHashMap::is_empty")]
    pub headers: LinkedHashMap<String, String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct GrpcOpts {
    pub grpc_service_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct HttpOpts {
    pub method: String,
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "LinkedHashMap::is_empty")]
    pub headers: LinkedHashMap<String, Vec<String>>,
}

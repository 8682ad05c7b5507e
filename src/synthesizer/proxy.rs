//! Record to proxy entry translation.

use linked_hash_map::LinkedHashMap;

use crate::config::proxy::{GrpcOpts, HttpOpts, RealityOpts, VlessProxy, WsOpts};
use crate::parser::{ProxyRecord, Transport};
use crate::synthesizer::templates::BENCHMARK_TIMEOUT;

/// Builds the client entry for one record, omitting keys that do not
/// apply to its transport and security.
pub fn proxy_entry(record: &ProxyRecord, benchmark_url: &str) -> VlessProxy {
    let tls = record.tls.as_ref();
    let params = &record.transport_params;
    let path = params.path.clone().unwrap_or_else(|| "/".to_string());

    let mut entry = VlessProxy {
        name: record.display_name.clone(),
        server: record.host.clone(),
        port: record.port,
        uuid: record.identity.clone(),
        network: record.transport.as_str().to_string(),
        tls: record.security.is_tls(),
        udp: true,
        flow: record.flow.clone(),
        servername: tls.and_then(|t| t.server_name.clone()),
        alpn: tls.map(|t| t.alpn.clone()).unwrap_or_default(),
        skip_cert_verify: tls.is_some_and(|t| t.skip_cert_verify),
        client_fingerprint: tls.map(|t| t.fingerprint.clone()),
        reality_opts: record.reality.as_ref().map(|r| RealityOpts {
            public_key: r.public_key.clone(),
            short_id: r.short_id.clone(),
        }),
        benchmark_url: Some(benchmark_url.to_string()),
        benchmark_timeout: Some(BENCHMARK_TIMEOUT),
        ..Default::default()
    };

    match record.transport {
        Transport::Tcp => {}
        Transport::Ws => {
            let mut headers = LinkedHashMap::new();
            if let Some(host) = &params.host {
                headers.insert("Host".to_string(), host.clone());
            }
            entry.ws_opts = Some(WsOpts { path, headers });
        }
        Transport::Grpc => {
            // no service name, no block
            entry.grpc_opts = params
                .service_name
                .clone()
                .map(|grpc_service_name| GrpcOpts { grpc_service_name });
        }
        Transport::Http => {
            let mut headers = LinkedHashMap::new();
            if let Some(host) = &params.host {
                headers.insert("Host".to_string(), vec![host.clone()]);
            }
            entry.http_opts = Some(HttpOpts {
                method: "GET".to_string(),
                path: vec![path],
                headers,
            });
        }
    }

    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{RealityParams, SecurityMode, TlsParams, TransportParams};

    fn reality_record() -> ProxyRecord {
        ProxyRecord {
            display_name: "Node A".to_string(),
            host: "1.2.3.4".to_string(),
            port: 443,
            identity: "b831381d-6324-4d53-ad4f-8cda48b30811".to_string(),
            transport: Transport::Tcp,
            security: SecurityMode::Reality,
            tls: Some(TlsParams {
                server_name: Some("example.com".to_string()),
                alpn: Vec::new(),
                fingerprint: "chrome".to_string(),
                skip_cert_verify: false,
            }),
            reality: Some(RealityParams {
                public_key: "KEY".to_string(),
                short_id: "ab".to_string(),
            }),
            flow: Some("xtls-rprx-vision".to_string()),
            transport_params: TransportParams::default(),
        }
    }

    #[test]
    fn test_reality_tcp_entry() {
        let entry = proxy_entry(&reality_record(), "http://probe");
        assert_eq!(entry.name, "Node A");
        assert_eq!(entry.network, "tcp");
        assert!(entry.tls);
        assert!(entry.udp);
        assert_eq!(entry.servername.as_deref(), Some("example.com"));
        assert_eq!(entry.client_fingerprint.as_deref(), Some("chrome"));
        assert_eq!(entry.flow.as_deref(), Some("xtls-rprx-vision"));
        let reality = entry.reality_opts.unwrap();
        assert_eq!(reality.public_key, "KEY");
        assert_eq!(reality.short_id, "ab");
        assert!(entry.ws_opts.is_none() && entry.grpc_opts.is_none() && entry.http_opts.is_none());
        assert_eq!(entry.benchmark_url.as_deref(), Some("http://probe"));
        assert_eq!(entry.benchmark_timeout, Some(5));
    }

    #[test]
    fn test_plain_entry_has_no_tls_keys() {
        let mut record = reality_record();
        record.security = SecurityMode::None;
        record.tls = None;
        record.reality = None;
        record.flow = None;

        let entry = proxy_entry(&record, "http://probe");
        assert!(!entry.tls);
        assert!(entry.servername.is_none());
        assert!(entry.client_fingerprint.is_none());
        assert!(entry.reality_opts.is_none());

        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert!(!yaml.contains("tls:"));
        assert!(!yaml.contains("reality-opts"));
    }

    #[test]
    fn test_ws_entry() {
        let mut record = reality_record();
        record.transport = Transport::Ws;
        record.transport_params = TransportParams {
            path: Some("/ws".to_string()),
            host: Some("cdn.example.com".to_string()),
            service_name: None,
        };
        let entry = proxy_entry(&record, "http://probe");
        assert_eq!(entry.network, "ws");
        let ws = entry.ws_opts.unwrap();
        assert_eq!(ws.path, "/ws");
        assert_eq!(ws.headers.get("Host").map(String::as_str), Some("cdn.example.com"));
    }

    #[test]
    fn test_grpc_entry() {
        let mut record = reality_record();
        record.transport = Transport::Grpc;
        record.transport_params.service_name = Some("svc".to_string());
        let entry = proxy_entry(&record, "http://probe");
        assert_eq!(entry.network, "grpc");
        assert_eq!(entry.grpc_opts.unwrap().grpc_service_name, "svc");
    }

    #[test]
    fn test_grpc_entry_without_service_name_omits_block() {
        let mut record = reality_record();
        record.transport = Transport::Grpc;
        let entry = proxy_entry(&record, "http://probe");
        assert_eq!(entry.network, "grpc");
        assert!(entry.grpc_opts.is_none());

        let yaml = serde_yaml::to_string(&entry).unwrap();
        assert!(!yaml.contains("grpc-opts"));
        assert!(!yaml.contains("{}"));
        assert!(!yaml.contains("[]"));
    }

    #[test]
    fn test_http_entry_defaults_path() {
        let mut record = reality_record();
        record.transport = Transport::Http;
        let entry = proxy_entry(&record, "http://probe");
        let http = entry.http_opts.unwrap();
        assert_eq!(http.method, "GET");
        assert_eq!(http.path, vec!["/"]);
        assert!(http.headers.is_empty());
    }
}

//! Host and port validation for link authorities.

use std::net::IpAddr;

use super::RejectReason;

/// Maximum length of a DNS name.
const MAX_DOMAIN_LEN: usize = 253;
/// Maximum length of one DNS label.
const MAX_LABEL_LEN: usize = 63;

/// Splits `host:port`, handling bracketed IPv6 (`[::1]:443`).
///
/// The returned host has its brackets removed.
pub fn parse_host_port(hostport: &str) -> Result<(String, u16), RejectReason> {
    let (host, port_str) = if let Some(rest) = hostport.strip_prefix('[') {
        let bracket_end = rest
            .find(']')
            .ok_or_else(|| RejectReason::InvalidHost(hostport.to_string()))?;
        let host = &rest[..bracket_end];
        let port_str = rest[bracket_end + 1..]
            .strip_prefix(':')
            .ok_or_else(|| RejectReason::InvalidPort(String::new()))?;
        (host, port_str)
    } else {
        hostport
            .rsplit_once(':')
            .ok_or_else(|| RejectReason::InvalidPort(String::new()))?
    };

    let port = parse_port(port_str)?;
    let host = host.trim();
    if !is_valid_host(host) {
        return Err(RejectReason::InvalidHost(host.to_string()));
    }

    Ok((host.to_string(), port))
}

/// Parses a decimal port in `1..=65535`.
pub fn parse_port(value: &str) -> Result<u16, RejectReason> {
    let invalid = || RejectReason::InvalidPort(value.to_string());
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match value.parse::<u32>() {
        Ok(port @ 1..=65535) => u16::try_from(port).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Accepts an IP literal or a dotted DNS name.
pub fn is_valid_host(host: &str) -> bool {
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    is_valid_domain(host)
}

fn is_valid_domain(host: &str) -> bool {
    if host.len() < 3 || host.len() > MAX_DOMAIN_LEN || !host.contains('.') {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}

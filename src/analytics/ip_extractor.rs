//! Client IP extraction from HTTP headers with trust validation
//!
//! This module implements client IP extraction that:
//! - Validates trust chains for X-Forwarded-For and Forwarded headers
//! - Supports the Cloudflare CF-Connecting-IP header
//! - Falls back to the socket remote address when headers are untrusted
//! - Handles both IPv4 and IPv6

use axum::http::HeaderMap;
use std::net::IpAddr;
use tracing::warn;

use crate::config::{AnalyticsConfig, TrustedProxyMode};

/// Extract the client IP address from HTTP headers
///
/// # Arguments
/// * `headers` - HTTP request headers
/// * `socket_addr` - The socket remote address (fallback)
/// * `config` - Analytics configuration with trust settings
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: IpAddr,
    config: &AnalyticsConfig,
) -> IpAddr {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).unwrap_or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_addr
        }),
        TrustedProxyMode::Standard => {
            if !config.trusted_proxies.is_empty() && !is_trusted(socket_addr, config) {
                return socket_addr;
            }
            extract_standard_ip(headers, config).unwrap_or(socket_addr)
        }
        TrustedProxyMode::None => socket_addr,
    }
}

fn is_trusted(ip: IpAddr, config: &AnalyticsConfig) -> bool {
    let ip = ip.to_canonical();
    config.trusted_proxies.iter().any(|net| net.contains(&ip))
}

fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Prefer RFC 7239 Forwarded, fall back to X-Forwarded-For
fn extract_standard_ip(headers: &HeaderMap, config: &AnalyticsConfig) -> Option<IpAddr> {
    let forwarded = forwarded_chain(headers);
    if !forwarded.is_empty() {
        return select_from_chain(&forwarded, config);
    }

    let xff = x_forwarded_for_chain(headers);
    select_from_chain(&xff, config)
}

/// Parse the `for=` parameters of a Forwarded header, left to right
///
/// Accepts `for=192.0.2.60`, `for=192.0.2.60:8080` and
/// `for="[2001:db8::1]:4711"`. Obfuscated identifiers are skipped.
fn forwarded_chain(headers: &HeaderMap) -> Vec<IpAddr> {
    let Some(forwarded) = headers.get("forwarded").and_then(|h| h.to_str().ok()) else {
        return Vec::new();
    };

    forwarded
        .split(',')
        .flat_map(|element| element.split(';'))
        .filter_map(|param| {
            let param = param.trim();
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("for") {
                return None;
            }
            parse_forwarded_node(value.trim().trim_matches('"'))
        })
        .collect()
}

fn parse_forwarded_node(node: &str) -> Option<IpAddr> {
    if let Some(rest) = node.strip_prefix('[') {
        let (addr, _) = rest.split_once(']')?;
        return addr.parse().ok();
    }
    if let Ok(ip) = node.parse::<IpAddr>() {
        return Some(ip);
    }
    // IPv4 with port
    let (addr, _port) = node.rsplit_once(':')?;
    addr.parse().ok()
}

fn x_forwarded_for_chain(headers: &HeaderMap) -> Vec<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(|xff| {
            xff.split(',')
                .filter_map(|s| s.trim().parse::<IpAddr>().ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Pick the client from a proxy chain using right-to-left trust validation
fn select_from_chain(ips: &[IpAddr], config: &AnalyticsConfig) -> Option<IpAddr> {
    if ips.is_empty() {
        return None;
    }

    // Skip a fixed number of trusted hops from the right
    if let Some(num_trusted) = config.num_trusted_proxies {
        if ips.len() > num_trusted {
            return Some(ips[ips.len() - num_trusted - 1]);
        }
        return ips.first().copied();
    }

    // First address from the right that is not a trusted proxy
    if !config.trusted_proxies.is_empty() {
        return ips
            .iter()
            .rev()
            .find(|ip| !is_trusted(**ip, config))
            .or_else(|| ips.first())
            .copied();
    }

    ips.last().copied()
}

//! Host address parsing.
//!
//! Host options accept tokens of the form `host`, `host:port`, or
//! `host:port|schema`. IPv6 addresses must be wrapped in brackets on input
//! and keep their brackets on output.

use crate::error::{DriftError, Result};

/// Splits an address into a hostname and an optional port.
///
/// Accepts a hostname, IPv4 address, or bracket-wrapped IPv6 address,
/// optionally followed by a colon and port number. Returns 0 for the port
/// when none is present.
pub fn split_host_optional_port(addr: &str) -> Result<(String, u16)> {
    if addr.is_empty() {
        return Err(DriftError::BlankHostAddress);
    }

    // Bracket-wrapped IPv6, optionally followed by :port
    if let Some(rest) = addr.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| DriftError::InvalidHostAddress(addr.to_string()))?;
        let host = format!("[{}]", &rest[..end]);
        let tail = &rest[end + 1..];
        if tail.is_empty() {
            return Ok((host, 0));
        }
        let port_str = tail
            .strip_prefix(':')
            .ok_or_else(|| DriftError::InvalidHostAddress(addr.to_string()))?;
        let port = parse_port(addr, port_str)?;
        return Ok((host, port));
    }

    match addr.matches(':').count() {
        0 => Ok((addr.to_string(), 0)),
        1 => {
            let (host, port_str) = addr.split_once(':').unwrap_or((addr, ""));
            if host.is_empty() {
                return Err(DriftError::InvalidHostAddress(addr.to_string()));
            }
            let port = parse_port(addr, port_str)?;
            Ok((host.to_string(), port))
        }
        // Unbracketed IPv6 is ambiguous
        _ => Err(DriftError::InvalidHostAddress(addr.to_string())),
    }
}

/// Splits an address into a hostname, an optional port, and an optional
/// schema name.
///
/// The schema portion follows a pipe separator, e.g. `db1:3307|app_db`.
/// Returns an empty string for the schema when none is present.
pub fn split_host_optional_port_and_schema(addr: &str) -> Result<(String, u16, String)> {
    if addr.is_empty() {
        return Err(DriftError::BlankHostAddress);
    }

    let mut parts = addr.splitn(2, '|');
    let host_part = parts.next().unwrap_or_default();
    let schema = parts.next().unwrap_or_default();
    if schema.contains('|') || (addr.contains('|') && schema.is_empty()) {
        return Err(DriftError::InvalidHostAddress(addr.to_string()));
    }

    let (host, port) = split_host_optional_port(host_part)?;
    Ok((host, port, schema.to_string()))
}

fn parse_port(addr: &str, port_str: &str) -> Result<u16> {
    let port: u16 = port_str
        .parse()
        .map_err(|_| DriftError::InvalidHostAddress(addr.to_string()))?;
    if port == 0 {
        return Err(DriftError::InvalidHostAddress(addr.to_string()));
    }
    Ok(port)
}

//! Readiness detection from registry output.
//!
//! The server announces itself with a line such as
//!
//! ```text
//!  warn --- http address - http://localhost:4873/ - verdaccio/5.31.1
//! ```
//!
//! The bound host and port are taken from that line rather than from the
//! requested port, which the server may not have been able to use.

/// Host and port the registry actually bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAddress {
    pub host: String,
    pub port: u16,
}

/// Marker preceding the bound URL. Other lines (uplinks, config paths) may
/// carry URLs of their own.
const READY_MARKER: &str = "http address";

/// Parse the `http(s)://host:port` URL following the readiness marker.
pub fn parse_registry_line(line: &str) -> Option<RegistryAddress> {
    let after_marker = &line[line.find(READY_MARKER)? + READY_MARKER.len()..];
    let start = after_marker
        .find("http://")
        .or_else(|| after_marker.find("https://"))?;
    let rest = &after_marker[start..];
    let rest = &rest[rest.find("://")? + 3..];
    let authority = rest
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()?;

    let (host, port) = match authority.strip_prefix('[') {
        // [::1]:4873
        Some(v6) => {
            let (host, rest) = v6.split_once(']')?;
            (host, rest.strip_prefix(':')?)
        }
        None => authority.rsplit_once(':')?,
    };
    if host.is_empty() {
        return None;
    }
    Some(RegistryAddress {
        host: host.to_string(),
        port: port.parse().ok()?,
    })
}

/// Scan complete lines of accumulated output for the readiness announcement.
/// A trailing line without a newline may still be in flight and is skipped.
pub fn find_ready_address(output: &str) -> Option<RegistryAddress> {
    let complete = match output.rfind('\n') {
        Some(end) => &output[..end],
        None => return None,
    };
    complete.lines().find_map(parse_registry_line)
}

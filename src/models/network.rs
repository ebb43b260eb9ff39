//! IPv4 helpers for network segments.

use std::net::Ipv4Addr;

/// Longest valid IPv4 prefix.
pub const MAX_PREFIX: i32 = 32;

/// Renders a prefix length as a dotted-quad mask, e.g. `24` -> `255.255.255.0`.
///
/// Returns `None` when `bits` is outside `0..=32`.
#[must_use]
pub fn subnet_mask(bits: i32) -> Option<String> {
    let bits = u32::try_from(bits).ok().filter(|b| *b <= 32)?;
    let mask = u32::MAX.checked_shl(32 - bits).unwrap_or(0);
    Some(Ipv4Addr::from(mask).to_string())
}

/// `10.0.0.0/24` style rendering used in lists.
#[must_use]
pub fn cidr(address: &str, bits: i32) -> String {
    format!("{address}/{bits}")
}

/// Parses a dotted-quad address, rejecting anything else (hostnames, IPv6).
#[must_use]
pub fn parse_ipv4(value: &str) -> Option<Ipv4Addr> {
    value.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_mask() {
        assert_eq!(subnet_mask(0).as_deref(), Some("0.0.0.0"));
        assert_eq!(subnet_mask(8).as_deref(), Some("255.0.0.0"));
        assert_eq!(subnet_mask(20).as_deref(), Some("255.255.240.0"));
        assert_eq!(subnet_mask(24).as_deref(), Some("255.255.255.0"));
        assert_eq!(subnet_mask(31).as_deref(), Some("255.255.255.254"));
        assert_eq!(subnet_mask(32).as_deref(), Some("255.255.255.255"));
    }

    #[test]
    fn test_subnet_mask_out_of_range() {
        assert_eq!(subnet_mask(-1), None);
        assert_eq!(subnet_mask(33), None);
    }

    #[test]
    fn test_parse_ipv4() {
        assert!(parse_ipv4("192.168.1.10").is_some());
        assert!(parse_ipv4(" 10.0.0.1 ").is_some());
        assert!(parse_ipv4("256.1.1.1").is_none());
        assert!(parse_ipv4("server01").is_none());
        assert!(parse_ipv4("::1").is_none());
    }

    #[test]
    fn test_cidr() {
        assert_eq!(cidr("10.1.0.0", 16), "10.1.0.0/16");
    }
}

//! Address and domain syntax checks.
//!
//! Pure predicates; nothing here touches the override file. Unlike
//! [`std::net::IpAddr`] parsing, IPv6 with an embedded IPv4 tail is rejected.

use crate::error::{OverrideError, Result};
use crate::record::Record;

/// Longest domain name accepted, in bytes.
pub const MAX_DOMAIN_LEN: usize = 253;

/// Longest single label accepted, in bytes.
pub const MAX_LABEL_LEN: usize = 63;

/// Returns `true` for dotted-quad IPv4 without leading zeros.
///
/// ```
/// use dns_overrides::validate::is_valid_ipv4;
///
/// assert!(is_valid_ipv4("192.168.1.1"));
/// assert!(!is_valid_ipv4("192.168.01.1"));
/// assert!(!is_valid_ipv4("1.1.1"));
/// ```
#[must_use]
pub fn is_valid_ipv4(s: &str) -> bool {
    let groups: Vec<&str> = s.split('.').collect();
    groups.len() == 4 && groups.iter().all(|g| is_octet(g))
}

fn is_octet(g: &str) -> bool {
    if g.is_empty() || g.len() > 3 || !g.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if g.len() > 1 && g.starts_with('0') {
        return false;
    }
    g.parse::<u16>().is_ok_and(|n| n <= 255)
}

/// Returns `true` for full or `::`-compressed IPv6 hextet notation.
///
/// ```
/// use dns_overrides::validate::is_valid_ipv6;
///
/// assert!(is_valid_ipv6("::1"));
/// assert!(is_valid_ipv6("fe80::1"));
/// assert!(!is_valid_ipv6(":::1"));
/// assert!(!is_valid_ipv6("192.168.1.1"));
/// ```
#[must_use]
pub fn is_valid_ipv6(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    match s.split_once("::") {
        None => {
            let groups: Vec<&str> = s.split(':').collect();
            groups.len() == 8 && groups.iter().all(|g| is_hextet(g))
        }
        Some((head, tail)) => {
            if tail.contains("::") {
                return false;
            }
            let (Some(head), Some(tail)) = (hextets(head), hextets(tail)) else {
                return false;
            };
            // `::` stands for at least one zero group.
            head + tail <= 7
        }
    }
}

/// Counts the hextets on one side of a `::`, or `None` if any is malformed.
fn hextets(side: &str) -> Option<usize> {
    if side.is_empty() {
        return Some(0);
    }
    let mut count = 0;
    for g in side.split(':') {
        if !is_hextet(g) {
            return None;
        }
        count += 1;
    }
    Some(count)
}

fn is_hextet(g: &str) -> bool {
    (1..=4).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns `true` if `s` is a valid IPv4 or IPv6 address.
#[must_use]
pub fn is_valid_ip(s: &str) -> bool {
    is_valid_ipv4(s) || is_valid_ipv6(s)
}

/// Returns `true` for a hostname made of 1–63 byte alphanumeric labels.
///
/// Labels may contain interior hyphens but must start and end with an ASCII
/// letter or digit. The whole name is capped at [`MAX_DOMAIN_LEN`].
#[must_use]
pub fn is_valid_domain(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_DOMAIN_LEN && s.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    label.len() <= MAX_LABEL_LEN
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}

/// An add or delete request as received from a front end.
///
/// Either field may be absent; [`validate_record_input`] decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordInput {
    /// Address the name should resolve to.
    pub ip: Option<String>,
    /// Domain name being overridden.
    pub record: Option<String>,
}

impl RecordInput {
    /// Creates an input with both fields present.
    #[must_use]
    pub fn new(ip: impl Into<String>, record: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            record: Some(record.into()),
        }
    }
}

/// Validates a request, returning the record it describes.
///
/// Checks run in order and the first failure wins: both fields present and
/// non-empty, then the IP, then the domain.
///
/// # Errors
///
/// Returns [`OverrideError::Validation`] with a human-readable reason.
pub fn validate_record_input(input: &RecordInput) -> Result<Record> {
    let (Some(ip), Some(record)) = (
        input.ip.as_deref().filter(|s| !s.is_empty()),
        input.record.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(OverrideError::Validation(
            "Both IP and record fields are required".into(),
        ));
    };
    if !is_valid_ip(ip) {
        return Err(OverrideError::Validation(format!(
            "Invalid IP address: {ip}"
        )));
    }
    if !is_valid_domain(record) {
        return Err(OverrideError::Validation(format!(
            "Invalid domain name: {record}"
        )));
    }
    Ok(Record::new(ip, record))
}

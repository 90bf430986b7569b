//! Override records and the line format that stores them.

use std::fmt;

/// One `address name` override entry.
///
/// A plain value: two records are equal iff both fields match exactly
/// after trimming. Fields are private so every record goes through
/// [`Record::new`].
///
/// # Example
///
/// ```
/// use dns_overrides::Record;
///
/// let record = Record::new(" 192.168.1.2", "nas.home.lab ");
/// assert_eq!(record.to_string(), "192.168.1.2 nas.home.lab");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    address: String,
    name: String,
}

impl Record {
    /// Creates a record, trimming surrounding whitespace from both fields.
    #[must_use]
    pub fn new(address: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        Self {
            address: address.as_ref().trim().to_string(),
            name: name.as_ref().trim().to_string(),
        }
    }

    /// Address the name resolves to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Overridden domain name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this record has the given address and name.
    #[must_use]
    pub fn matches(&self, address: &str, name: &str) -> bool {
        self.address == address.trim() && self.name == name.trim()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.name)
    }
}

/// Outcome of parsing one override-file line.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// Empty or whitespace-only.
    Blank,
    /// Exactly two whitespace-separated tokens.
    Record(Record),
    /// Any other token count.
    Malformed,
}

/// Parses a single override-file line.
#[must_use]
pub fn parse_line(line: &str) -> Line {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (None, _, _) => Line::Blank,
        (Some(address), Some(name), None) => Line::Record(Record::new(address, name)),
        _ => Line::Malformed,
    }
}

/// Parses override-file content into records, in file order.
///
/// Blank lines are ignored. Malformed lines are skipped with a warning.
#[must_use]
pub fn parse_records(content: &str) -> Vec<Record> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match parse_line(line) {
            Line::Record(record) => Some(record),
            Line::Blank => None,
            Line::Malformed => {
                tracing::warn!(line = idx + 1, content = %line, "Skipping malformed override line");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_surrounding_whitespace() {
        assert_eq!(Record::new("1.1.1.1 ", "a.lan"), Record::new("1.1.1.1", " a.lan"));
        assert_ne!(Record::new("1.1.1.1", "A.lan"), Record::new("1.1.1.1", "a.lan"));
    }

    #[test]
    fn accessors_expose_trimmed_fields() {
        let record = Record::new("\t10.0.0.1 ", " nas.lan\n");
        assert_eq!(record.address(), "10.0.0.1");
        assert_eq!(record.name(), "nas.lan");
        assert!(record.matches(" 10.0.0.1", "nas.lan "));
    }

    #[test]
    fn parse_line_classifies() {
        assert_eq!(parse_line("   "), Line::Blank);
        assert_eq!(
            parse_line("192.168.1.1\t  router.lan"),
            Line::Record(Record::new("192.168.1.1", "router.lan"))
        );
        assert_eq!(parse_line("192.168.1.1"), Line::Malformed);
        assert_eq!(parse_line("192.168.1.1 a.lan b.lan"), Line::Malformed);
    }

    #[test]
    fn parse_records_keeps_order_and_skips_noise() {
        let content = "192.168.1.1 a.lan\n\nbroken\n::1   b.lan\n\n\n";
        assert_eq!(
            parse_records(content),
            vec![Record::new("192.168.1.1", "a.lan"), Record::new("::1", "b.lan")]
        );
    }

    #[test]
    fn parse_records_empty_file() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("\n\n").is_empty());
    }
}

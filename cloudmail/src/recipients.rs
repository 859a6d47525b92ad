//! Recipient list parsing shared by the server and the terminal client.
//!
//! The format check is deliberately permissive: `local@domain.tld`, with no
//! whitespace or extra `@` in any part. It is not RFC 5322 and performs no DNS
//! lookups.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static address pattern"));

/// Why a raw recipient string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipientError {
    /// Nothing but whitespace was supplied.
    #[error("At least one recipient email address is required")]
    Empty,
    /// Every entry that failed the format check, in input order.
    #[error("Invalid email addresses: {}", display_entries(.0))]
    Invalid(Vec<String>),
}

fn display_entries(entries: &[String]) -> String {
    entries
        .iter()
        .map(|e| if e.is_empty() { "(empty)" } else { e.as_str() })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ordered, trimmed, syntactically valid addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientList(Vec<String>);

impl RecipientList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a list produced by [`parse_recipients`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a RecipientList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RecipientList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Returns true if `address` passes the format check. `address` is not trimmed.
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS.is_match(address)
}

/// Split a comma-separated address string and check every entry.
///
/// All offending entries are reported at once rather than only the first.
pub fn parse_recipients(raw: &str) -> Result<RecipientList, RecipientError> {
    if raw.trim().is_empty() {
        return Err(RecipientError::Empty);
    }

    let entries: Vec<String> = raw.split(',').map(|e| e.trim().to_string()).collect();
    let invalid: Vec<String> = entries
        .iter()
        .filter(|e| !is_valid_address(e))
        .cloned()
        .collect();

    if invalid.is_empty() {
        Ok(RecipientList(entries))
    } else {
        Err(RecipientError::Invalid(invalid))
    }
}

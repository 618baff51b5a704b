use std::fmt;

/// Country a node is attributed to: a two-letter code or `UNKNOWN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode(String);

impl CountryCode {
    pub const UNKNOWN: &'static str = "UNKNOWN";

    /// Builds a code from two ASCII letters, upper-casing them.
    ///
    /// Anything else (including the `-` ip2location returns for unmapped
    /// addresses) is rejected.
    pub fn new(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(CountryCode(code.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn unknown() -> Self {
        CountryCode(Self::UNKNOWN.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used to name the per-country file.
    pub fn file_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

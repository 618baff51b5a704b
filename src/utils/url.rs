//! URL encoding/decoding utilities

use url::Url;

/// Decodes a URL-encoded string
///
/// # Arguments
/// * `input` - The URL-encoded string to decode
///
/// # Returns
/// * String containing the decoded input
/// * Returns the original string if decoding fails
///
/// # Examples
/// ```
/// use subgen::utils::url::url_decode;
///
/// let decoded = url_decode("JP%20Tokyo%2001");
/// assert_eq!(decoded, "JP Tokyo 01");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Whether the location points at an HTTP(S) resource rather than a local file.
pub fn is_link(location: &str) -> bool {
    Url::parse(location)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("%E6%97%A5%E6%9C%AC"), "日本");
        assert_eq!(url_decode("plain"), "plain");
        // Invalid UTF-8 sequences fall back to the raw input
        assert_eq!(url_decode("%FF"), "%FF");
    }

    #[test]
    fn test_is_link() {
        assert!(is_link("https://example.com/sub?token=abc"));
        assert!(is_link("http://127.0.0.1:8080/sub"));
        assert!(!is_link("/etc/subgen/sub.txt"));
        assert!(!is_link("sub.txt"));
        assert!(!is_link("ftp://example.com/sub"));
    }
}

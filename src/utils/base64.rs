use base64::{engine::general_purpose, Engine as _};

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Pads a Base64 string with `=` until its length is a multiple of 4.
///
/// Any padding already present is stripped first, so blobs that carry a
/// full, partial or no padding tail all normalise to the same string.
pub fn pad_base64(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('=');
    let mut padded = trimmed.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    padded
}

/// Reverses a URL-safe Base64 string to standard Base64 format.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input.replace('-', "+").replace('_', "/")
}

/// Decodes a Base64 blob that may use either alphabet and may have lost its
/// padding on the way.
///
/// # Returns
/// The decoded bytes, or the engine error if the blob is not Base64 at all.
pub fn decode_lenient(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let normalized = pad_base64(&url_safe_base64_reverse(input));
    general_purpose::STANDARD.decode(normalized)
}

/// Same as [`decode_lenient`] but requires the payload to be UTF-8 text.
pub fn decode_lenient_str(input: &str) -> Option<String> {
    decode_lenient(input)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Encodes a string to URL-safe Base64 format without padding.
pub fn url_safe_base64_encode(input: &str) -> String {
    base64_encode(input)
        .replace('+', "-")
        .replace('/', "_")
        .replace('=', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_base64() {
        assert_eq!(pad_base64("YQ"), "YQ==");
        assert_eq!(pad_base64("YWI"), "YWI=");
        assert_eq!(pad_base64("YWJj"), "YWJj");
        assert_eq!(pad_base64("YQ=="), "YQ==");
        assert_eq!(pad_base64("YQ="), "YQ==");
    }

    #[test]
    fn test_decode_missing_padding() {
        // "aes-256-gcm:pw" encodes to a blob ending in a single '='
        let full = "YWVzLTI1Ni1nY206cHc=";
        let expected = b"aes-256-gcm:pw".to_vec();
        assert_eq!(decode_lenient(full).unwrap(), expected);
        assert_eq!(decode_lenient(full.trim_end_matches('=')).unwrap(), expected);

        // "a" needs two padding characters
        assert_eq!(decode_lenient("YQ==").unwrap(), b"a".to_vec());
        assert_eq!(decode_lenient("YQ=").unwrap(), b"a".to_vec());
        assert_eq!(decode_lenient("YQ").unwrap(), b"a".to_vec());
    }

    #[test]
    fn test_decode_url_safe_alphabet() {
        let encoded = url_safe_base64_encode("??>>");
        assert!(encoded.contains('_') || encoded.contains('-'));
        assert_eq!(decode_lenient_str(&encoded).unwrap(), "??>>");
    }

    #[test]
    fn test_decode_invalid() {
        assert!(decode_lenient("not base64!").is_err());
        assert!(decode_lenient_str("//79").is_none());
    }
}

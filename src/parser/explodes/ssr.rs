use std::collections::HashMap;

use crate::models::{CanonicalNode, Credential};
use crate::parser::types::{preview, DecodeContext};
use crate::parser::DecodeError;
use crate::utils::base64::decode_lenient_str;

use super::common::{parse_port, strip_scheme};

/// Parse a ShadowsocksR link into a canonical node
///
/// Layout once the payload is Base64-decoded:
/// `host:port:protocol:method:obfs:base64(password)/?key=base64(value)&...`
pub fn explode_ssr(ssr: &str, ctx: &DecodeContext) -> Result<CanonicalNode, DecodeError> {
    let encoded = strip_scheme(ssr, "ssr://")?;
    let decoded =
        decode_lenient_str(encoded).ok_or_else(|| DecodeError::InvalidBase64(preview(ssr)))?;

    let (terms, query) = match decoded.split_once("/?") {
        Some((terms, query)) => (terms, query),
        None => (decoded.trim_end_matches('/'), ""),
    };

    // The host may itself contain ':' (IPv6), so count fields from the right
    let mut fields: Vec<&str> = terms.rsplitn(6, ':').collect();
    if fields.len() != 6 {
        return Err(DecodeError::MalformedUri(format!(
            "expected 6 positional fields, got {}",
            fields.len()
        )));
    }
    fields.reverse();
    let [server, port, protocol, method, obfs, password_b64] = [
        fields[0], fields[1], fields[2], fields[3], fields[4], fields[5],
    ];

    let server = server.trim_start_matches('[').trim_end_matches(']');
    if server.is_empty() {
        return Err(DecodeError::MalformedUri("missing host".to_string()));
    }
    let port = parse_port(port)?;
    let password = decode_lenient_str(password_b64)
        .ok_or_else(|| DecodeError::InvalidBase64("password".to_string()))?;

    let params = parse_params(query)?;
    let remark = params
        .get("remarks")
        .cloned()
        .unwrap_or_else(|| format!("{} ({})", server, port));

    if let Some(keyword) = ctx.filters.placeholder_in(&remark) {
        return Err(DecodeError::Placeholder(keyword.to_string()));
    }

    let param = |key: &str| params.get(key).cloned().unwrap_or_default();

    Ok(CanonicalNode {
        display_text: remark,
        server: server.to_string(),
        port,
        credential: Credential::ShadowsocksR {
            method: method.to_string(),
            password,
            protocol: protocol.to_string(),
            protocol_param: param("protoparam"),
            obfs: obfs.to_string(),
            obfs_param: param("obfsparam"),
        },
        transport: None,
    })
}

/// Parses `key=base64(value)&...`, decoding every value.
fn parse_params(query: &str) -> Result<HashMap<String, String>, DecodeError> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| DecodeError::MalformedUri(format!("bad query pair {}", pair)))?;
        let value = decode_lenient_str(value)
            .ok_or_else(|| DecodeError::InvalidBase64(format!("query value `{}`", key)))?;
        params.insert(key.to_string(), value);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FilterSettings;
    use crate::utils::base64::{base64_encode, url_safe_base64_encode};

    fn decode(link: &str) -> Result<CanonicalNode, DecodeError> {
        let filters = FilterSettings::default();
        explode_ssr(link, &DecodeContext::new("test", &filters))
    }

    fn ssr_link(remark: &str) -> String {
        let body = format!(
            "example.com:8388:auth_aes128_md5:aes-256-cfb:tls1.2_ticket_auth:{}/?obfsparam={}&protoparam={}&remarks={}&group={}",
            url_safe_base64_encode("test"),
            url_safe_base64_encode("obfs.example.com"),
            url_safe_base64_encode("32:abc"),
            url_safe_base64_encode(remark),
            url_safe_base64_encode("Test SSR"),
        );
        format!("ssr://{}", url_safe_base64_encode(&body))
    }

    #[test]
    fn test_explode_ssr_valid_link() {
        // Link as handed out by providers, standard alphabet with padding
        let node = decode("ssr://ZXhhbXBsZS5jb206ODM4ODphdXRoX2FlczEyOF9tZDU6YWVzLTI1Ni1jZmI6dGxzMS4yX3RpY2tldF9hdXRoOmRHVnpkQT09Lz9vYmZzcGFyYW09ZEdWemRBPT0mcHJvdG9wYXJhbT1kR1Z6ZEE9PSZyZW1hcmtzPVZHVnpkQ0JUVTFJPSZncm91cD1WR1Z6ZENCVFUxST0=").unwrap();

        assert_eq!(node.server, "example.com");
        assert_eq!(node.port, 8388);
        assert_eq!(node.display_text, "Test SSR");
        assert_eq!(
            node.credential,
            Credential::ShadowsocksR {
                method: "aes-256-cfb".to_string(),
                password: "test".to_string(),
                protocol: "auth_aes128_md5".to_string(),
                protocol_param: "test".to_string(),
                obfs: "tls1.2_ticket_auth".to_string(),
                obfs_param: "test".to_string(),
            }
        );
    }

    #[test]
    fn test_explode_ssr_url_safe_params() {
        let node = decode(&ssr_link("日本 01")).unwrap();
        assert_eq!(node.display_text, "日本 01");
        match node.credential {
            Credential::ShadowsocksR {
                protocol_param,
                obfs_param,
                ..
            } => {
                assert_eq!(protocol_param, "32:abc");
                assert_eq!(obfs_param, "obfs.example.com");
            }
            other => panic!("unexpected credential {:?}", other),
        }
    }

    #[test]
    fn test_explode_ssr_placeholders() {
        assert!(decode(&ssr_link("剩余流量：100G")).unwrap_err().is_placeholder());
        assert!(decode(&ssr_link("过期时间：2026-12-01")).unwrap_err().is_placeholder());
    }

    #[test]
    fn test_explode_ssr_without_query() {
        let link = format!(
            "ssr://{}",
            base64_encode(&format!(
                "example.com:8388:origin:aes-256-cfb:plain:{}",
                base64_encode("password123")
            ))
        );
        let node = decode(&link).unwrap();
        assert_eq!(node.display_text, "example.com (8388)");
        match node.credential {
            Credential::ShadowsocksR { password, .. } => assert_eq!(password, "password123"),
            other => panic!("unexpected credential {:?}", other),
        }
    }

    #[test]
    fn test_explode_ssr_ipv6_host() {
        let link = format!(
            "ssr://{}",
            url_safe_base64_encode(&format!(
                "2001:db8::1:443:origin:none:plain:{}/?remarks={}",
                url_safe_base64_encode("pw"),
                url_safe_base64_encode("v6")
            ))
        );
        let node = decode(&link).unwrap();
        assert_eq!(node.server, "2001:db8::1");
        assert_eq!(node.port, 443);
    }

    #[test]
    fn test_explode_ssr_errors() {
        assert!(matches!(
            decode("ssr://invalid!base64"),
            Err(DecodeError::InvalidBase64(_))
        ));

        let missing = format!("ssr://{}", base64_encode("example.com:8388:auth_aes128_md5"));
        assert!(matches!(decode(&missing), Err(DecodeError::MalformedUri(_))));

        let bad_query = format!(
            "ssr://{}",
            base64_encode(&format!(
                "example.com:8388:origin:none:plain:{}/?remarks=!!!",
                base64_encode("pw")
            ))
        );
        assert!(matches!(decode(&bad_query), Err(DecodeError::InvalidBase64(_))));

        let bad_port = format!(
            "ssr://{}",
            base64_encode(&format!("example.com:99999:origin:none:plain:{}", base64_encode("pw")))
        );
        assert!(matches!(decode(&bad_port), Err(DecodeError::InvalidPort(_))));
    }
}

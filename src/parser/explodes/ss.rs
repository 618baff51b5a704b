use crate::models::{CanonicalNode, Credential};
use crate::parser::types::{preview, DecodeContext};
use crate::parser::DecodeError;
use crate::utils::base64::decode_lenient_str;
use crate::utils::url::url_decode;

use super::common::{split_host_port, strip_scheme};

/// Parse a Shadowsocks link into a canonical node
///
/// Accepts both layouts providers hand out:
/// * `ss://base64(method:password)@host:port[/][?query]#remark`
/// * `ss://base64(method:password@host:port)#remark` (legacy)
pub fn explode_ss(ss: &str, ctx: &DecodeContext) -> Result<CanonicalNode, DecodeError> {
    let content = strip_scheme(ss, "ss://")?;

    // Extract fragment (remark) if present
    let (content, remark) = match content.split_once('#') {
        Some((content, remark)) => (content, url_decode(remark)),
        None => (content, String::new()),
    };

    if let Some(keyword) = ctx.filters.placeholder_in(&remark) {
        return Err(DecodeError::Placeholder(keyword.to_string()));
    }

    let (secret, host_port) = match content.split_once('@') {
        Some((secret, rest)) => {
            // Host runs up to the query string, or to the end
            let host = match rest.split_once('?') {
                Some((host, _)) => host,
                None => rest,
            };
            (decode_userinfo(secret)?, host.trim_end_matches('/').to_string())
        }
        None => {
            let blob = match content.split_once('?') {
                Some((blob, _)) => blob,
                None => content,
            };
            let decoded = decode_lenient_str(blob)
                .ok_or_else(|| DecodeError::InvalidBase64(preview(ss)))?;
            let (secret, host) = decoded.rsplit_once('@').ok_or_else(|| {
                DecodeError::MalformedUri(format!("cannot extract host from {}", preview(ss)))
            })?;
            (secret.to_string(), host.trim_end_matches('/').to_string())
        }
    };

    // Some providers put method:password@host inside the blob as well
    let method_password = match secret.split_once('@') {
        Some((mp, _)) => mp,
        None => secret.as_str(),
    };
    let (method, password) = split_credential(method_password)?;
    let (server, port) = split_host_port(&host_port)?;

    Ok(CanonicalNode {
        display_text: remark,
        server,
        port,
        credential: Credential::Shadowsocks { method, password },
        transport: None,
    })
}

/// Decodes the userinfo part of a SIP002 link.
///
/// Normally Base64, sometimes with its padding percent-escaped; 2022
/// ciphers may carry it percent-encoded in the clear.
fn decode_userinfo(secret: &str) -> Result<String, DecodeError> {
    let unescaped = url_decode(secret);
    if let Some(decoded) = decode_lenient_str(&unescaped) {
        return Ok(decoded);
    }

    if unescaped.contains(':') {
        Ok(unescaped)
    } else {
        Err(DecodeError::InvalidBase64(preview(secret)))
    }
}

/// Splits `method:password`.
///
/// Two parts is the classic layout. Three or more is a 2022 cipher whose
/// keys are kept joined with `:` as a single password.
fn split_credential(method_password: &str) -> Result<(String, String), DecodeError> {
    let parts: Vec<&str> = method_password.split(':').collect();
    match parts.as_slice() {
        [method, password] if !method.is_empty() => {
            Ok((method.to_string(), password.to_string()))
        }
        [method, keys @ ..] if keys.len() >= 2 && !method.is_empty() => {
            Ok((method.to_string(), keys.join(":")))
        }
        _ => Err(DecodeError::InvalidCredential(format!(
            "expected method:password, got {} field(s)",
            parts.len()
        ))),
    }
}

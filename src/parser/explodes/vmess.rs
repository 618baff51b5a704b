use serde_json::{Map, Value};

use crate::models::{CanonicalNode, Credential, Transport};
use crate::parser::types::{preview, DecodeContext};
use crate::parser::DecodeError;
use crate::utils::base64::decode_lenient_str;

use super::common::{parse_port, split_host_port, strip_scheme};

/// Provider whose `add` field is unreliable; the real address is the
/// `host:port` after the last `@` in its remark.
pub const REMARK_ADDRESS_PROVIDER: &str = "justmysocks";

/// Providers whose nodes are plain TCP regardless of `net`/`tls`.
pub const PLAIN_TRANSPORT_PROVIDERS: &[&str] = &["justmysocks", "popocloud-qiqi"];

/// Keys a v2 vmess share link may carry.
pub const ALLOWED_KEYS: &[&str] = &[
    "host",
    "add",
    "ps",
    "remark",
    "headerType",
    "v",
    "type",
    "class",
    "path",
    "tls",
    "verify_cert",
    "port",
    "aid",
    "net",
    "id",
    "node_area",
];

/// Parse a VMess link (`vmess://base64(json)`) into a canonical node
pub fn explode_vmess(vmess: &str, ctx: &DecodeContext) -> Result<CanonicalNode, DecodeError> {
    let encoded = strip_scheme(vmess, "vmess://")?;
    let decoded =
        decode_lenient_str(encoded).ok_or_else(|| DecodeError::InvalidBase64(preview(vmess)))?;

    let json: Value =
        serde_json::from_str(&decoded).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let raw = json
        .as_object()
        .ok_or_else(|| DecodeError::InvalidJson("payload is not an object".to_string()))?;

    let ps = json_str(raw, "ps");
    for remark in [ps.as_str(), json_str(raw, "remark").as_str()] {
        if let Some(keyword) = ctx.filters.placeholder_in(remark) {
            return Err(DecodeError::Placeholder(keyword.to_string()));
        }
    }

    if ctx.filters.strict_vmess_keys {
        check_raw_config(raw)?;
    }

    let mut server = json_str(raw, "add");
    let mut host = json_str(raw, "host");
    if ctx.subscription_name == REMARK_ADDRESS_PROVIDER {
        server = address_from_remark(&ps)?;
        host = server.clone();
    }
    if server.is_empty() {
        return Err(DecodeError::MalformedUri("missing `add`".to_string()));
    }

    let port = parse_port(&json_number(raw, "port").unwrap_or_default())?;
    let alter_id = match json_number(raw, "aid") {
        Some(aid) if !aid.is_empty() => aid
            .parse::<u16>()
            .map_err(|_| DecodeError::UnexpectedValue {
                key: "aid".to_string(),
                value: aid,
            })?,
        _ => 0,
    };

    let uuid = json_str(raw, "id");
    if uuid.is_empty() {
        return Err(DecodeError::InvalidCredential("missing `id`".to_string()));
    }

    let transport = if PLAIN_TRANSPORT_PROVIDERS.contains(&ctx.subscription_name) {
        None
    } else {
        let network = json_str(raw, "net");
        Some(Transport {
            network: if network.is_empty() {
                "tcp".to_string()
            } else {
                network
            },
            tls: json_str(raw, "tls") == "tls",
            path: json_str(raw, "path"),
            host,
            allow_insecure: !raw
                .get("verify_cert")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        })
    };

    Ok(CanonicalNode {
        display_text: ps,
        server,
        port,
        credential: Credential::VMess { uuid, alter_id },
        transport,
    })
}

/// Validates a payload against the fixed key set and header values.
pub fn check_raw_config(raw: &Map<String, Value>) -> Result<(), DecodeError> {
    if let Some(key) = raw.keys().find(|k| !ALLOWED_KEYS.contains(&k.as_str())) {
        return Err(DecodeError::UnknownKey(key.clone()));
    }

    let expect = |key: &str, expected: &str, default: Option<&str>| {
        let actual = match raw.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => other.to_string(),
            None => match default {
                Some(d) => d.to_string(),
                None => String::new(),
            },
        };
        if actual == expected {
            Ok(())
        } else {
            Err(DecodeError::UnexpectedValue {
                key: key.to_string(),
                value: actual,
            })
        }
    };

    expect("headerType", "none", Some("none"))?;
    expect("v", "2", None)?;
    expect("type", "none", None)?;

    match raw.get("class") {
        None => Ok(()),
        Some(Value::Number(n)) if n.as_i64() == Some(1) => Ok(()),
        Some(other) => Err(DecodeError::UnexpectedValue {
            key: "class".to_string(),
            value: other.to_string(),
        }),
    }
}

/// `"... @host:port"` → `host`
fn address_from_remark(remark: &str) -> Result<String, DecodeError> {
    let tail = remark.rsplit('@').next().unwrap_or_default();
    let (host, _) = split_host_port(tail.trim()).map_err(|_| {
        DecodeError::MalformedUri(format!("no host:port after '@' in remark {:?}", remark))
    })?;
    Ok(host)
}

fn json_str(raw: &Map<String, Value>, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numbers show up both as JSON numbers and as strings.
fn json_number(raw: &Map<String, Value>, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

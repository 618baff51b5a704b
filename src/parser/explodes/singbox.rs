use serde_json::Value;

use crate::parser::DecodeError;
use crate::settings::FilterSettings;

/// Check an outbound taken from a router-native subscription
///
/// Native outbounds skip URI decoding; they only have to be a real proxy
/// (supported `type`, a `server`) and not one of the info entries some
/// providers insert to show traffic and expiry.
pub fn check_native(outbound: &Value, filters: &FilterSettings) -> Result<(), DecodeError> {
    let outbound_type = outbound
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !filters.native_types.iter().any(|t| t == outbound_type) {
        return Err(DecodeError::UnsupportedType(outbound_type.to_string()));
    }

    let tag = outbound
        .get("tag")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if let Some(marker) = filters
        .native_info_markers
        .iter()
        .find(|m| !m.is_empty() && tag.contains(m.as_str()))
    {
        return Err(DecodeError::Placeholder(marker.clone()));
    }

    match outbound.get("server").and_then(Value::as_str) {
        Some(server) if !server.is_empty() => Ok(()),
        _ => Err(DecodeError::MalformedUri(format!(
            "outbound {:?} has no server",
            tag
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_native() {
        let filters = FilterSettings::default();

        let ok = json!({"type": "trojan", "tag": "HK 01", "server": "hk.example.com", "server_port": 443});
        assert!(check_native(&ok, &filters).is_ok());

        let direct = json!({"type": "direct", "tag": "direct"});
        assert_eq!(
            check_native(&direct, &filters),
            Err(DecodeError::UnsupportedType("direct".to_string()))
        );

        let info = json!({"type": "shadowsocks", "tag": "Traffic: 10 G | 100 G", "server": "1.1.1.1"});
        assert!(check_native(&info, &filters).unwrap_err().is_placeholder());

        let no_server = json!({"type": "vmess", "tag": "x"});
        assert!(matches!(
            check_native(&no_server, &filters),
            Err(DecodeError::MalformedUri(_))
        ));
    }
}

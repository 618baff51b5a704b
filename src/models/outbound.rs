use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the outbound list in every emitted document.
pub const OUTBOUNDS_KEY: &str = "outbounds";

/// One router outbound ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEntry {
    pub tag: String,
    /// Outbound `type`, e.g. `shadowsocks`
    pub protocol: String,
    /// Full JSON object as written to disk, `tag` included
    pub body: Value,
}

/// On-disk document holding a list of outbounds.
///
/// Used for both the per-country files and the selector file. Keys other
/// than `outbounds` are kept as they were found.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutboundConfigFile {
    #[serde(default)]
    pub outbounds: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutboundConfigFile {
    /// Position of the first outbound whose `tag` equals `tag`.
    pub fn position_of(&self, tag: &str) -> Option<usize> {
        self.outbounds
            .iter()
            .position(|ob| ob.get("tag").and_then(Value::as_str) == Some(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_file_keeps_extra_keys() {
        let doc: OutboundConfigFile = serde_json::from_value(json!({
            "outbounds": [{"tag": "a"}],
            "log": {"level": "warn"}
        }))
        .unwrap();
        assert_eq!(doc.outbounds.len(), 1);
        assert_eq!(doc.position_of("a"), Some(0));
        assert_eq!(doc.position_of("b"), None);

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["log"]["level"], "warn");
    }

    #[test]
    fn test_config_file_missing_list() {
        let doc: OutboundConfigFile = serde_json::from_str("{}").unwrap();
        assert!(doc.outbounds.is_empty());
    }
}

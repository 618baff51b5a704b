use serde::{Deserialize, Serialize};

/// Type of proxy group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyGroupType {
    #[serde(rename = "selector")]
    Select,
    #[serde(rename = "urltest")]
    URLTest,
}

impl ProxyGroupType {
    /// Get string representation of the proxy group type
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyGroupType::Select => "selector",
            ProxyGroupType::URLTest => "urltest",
        }
    }
}

/// Health-checked failover group written to the selector document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorEntry {
    /// Type of the proxy group
    #[serde(rename = "type")]
    pub group_type: ProxyGroupType,
    pub tag: String,
    /// Member outbound tags
    pub outbounds: Vec<String>,
    /// URL for testing
    pub url: String,
    /// Interval between tests, in router duration syntax (`1m`)
    pub interval: String,
    /// Tolerance value for tests, in milliseconds
    pub tolerance: u32,
}

impl SelectorEntry {
    /// Create a new url-test group with the given members
    pub fn url_test(tag: String, outbounds: Vec<String>, url: &str, interval: &str, tolerance: u32) -> Self {
        Self {
            group_type: ProxyGroupType::URLTest,
            tag,
            outbounds,
            url: url.to_string(),
            interval: interval.to_string(),
            tolerance,
        }
    }

    /// Get string representation of the group type
    pub fn type_str(&self) -> &'static str {
        self.group_type.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selector_entry_shape() {
        let entry = SelectorEntry::url_test(
            "BalancerJP".to_string(),
            vec!["node-JP-a-1.2.3.4-0".to_string()],
            "https://www.gstatic.com/generate_204",
            "1m",
            50,
        );
        assert_eq!(entry.type_str(), "urltest");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "type": "urltest",
                "tag": "BalancerJP",
                "outbounds": ["node-JP-a-1.2.3.4-0"],
                "url": "https://www.gstatic.com/generate_204",
                "interval": "1m",
                "tolerance": 50
            })
        );
    }
}

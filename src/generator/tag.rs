use linked_hash_map::LinkedHashMap;

use crate::models::{CountryCode, OutboundEntry};

/// First field of every generated tag.
pub const NODE_PREFIX: &str = "node";

/// Builds `node-{country}-{subscription}-{server}-{index}`.
///
/// `index` is the item's position in its subscription, so the same input
/// always yields the same tag.
pub fn node_tag(country: &CountryCode, subscription: &str, server: &str, index: usize) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        NODE_PREFIX, country, subscription, server, index
    )
}

/// Outbounds grouped per country, countries kept in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CountryBuckets {
    buckets: LinkedHashMap<CountryCode, Vec<OutboundEntry>>,
}

impl CountryBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, country: CountryCode, entry: OutboundEntry) {
        self.buckets.entry(country).or_insert_with(Vec::new).push(entry);
    }

    pub fn get(&self, country: &CountryCode) -> Option<&[OutboundEntry]> {
        self.buckets.get(country).map(Vec::as_slice)
    }

    /// Tags of one country's entries, in insertion order.
    pub fn tags(&self, country: &CountryCode) -> Vec<String> {
        self.get(country)
            .map(|entries| entries.iter().map(|e| e.tag.clone()).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CountryCode, &Vec<OutboundEntry>)> {
        self.buckets.iter()
    }

    pub fn countries(&self) -> impl Iterator<Item = &CountryCode> {
        self.buckets.keys()
    }

    /// Total number of entries across all countries.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(tag: &str) -> OutboundEntry {
        OutboundEntry {
            tag: tag.to_string(),
            protocol: "shadowsocks".to_string(),
            body: json!({ "tag": tag }),
        }
    }

    fn cc(code: &str) -> CountryCode {
        CountryCode::new(code).unwrap()
    }

    #[test]
    fn test_node_tag() {
        assert_eq!(
            node_tag(&cc("JP"), "sub", "1.2.3.4", 0),
            "node-JP-sub-1.2.3.4-0"
        );
        assert_eq!(
            node_tag(&CountryCode::unknown(), "sub", "a.example.com", 7),
            "node-UNKNOWN-sub-a.example.com-7"
        );
    }

    #[test]
    fn test_buckets_keep_first_seen_order() {
        let mut buckets = CountryBuckets::new();
        buckets.push(cc("US"), entry("u1"));
        buckets.push(cc("JP"), entry("j1"));
        buckets.push(cc("US"), entry("u2"));
        buckets.push(CountryCode::unknown(), entry("x1"));

        let order: Vec<&str> = buckets.countries().map(CountryCode::as_str).collect();
        assert_eq!(order, vec!["US", "JP", "UNKNOWN"]);
        assert_eq!(buckets.tags(&cc("US")), vec!["u1", "u2"]);
        assert_eq!(buckets.len(), 4);
        assert!(buckets.tags(&cc("DE")).is_empty());
    }
}

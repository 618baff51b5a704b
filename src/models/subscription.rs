use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One subscription feed as configured by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionSource {
    pub name: String,
    /// HTTP(S) URL, or a local file path
    pub url: String,
    #[serde(default)]
    pub index: u32,
}

impl SubscriptionSource {
    pub fn new(name: &str, url: &str, index: u32) -> Self {
        SubscriptionSource {
            name: name.to_string(),
            url: url.to_string(),
            index,
        }
    }
}

/// One item of a decoded subscription body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    /// A `scheme://...` share link
    Uri(String),
    /// An outbound already in router-native JSON form
    Native(Value),
}

/// A raw item together with its position in the subscription's sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionItem {
    /// 0-based position in the decoded sequence, reset per subscription
    pub index: usize,
    pub raw: RawItem,
}

/// How the body of a subscription was recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Router-native JSON document with an outbound list
    Native,
    /// Plain newline-delimited share links
    UriList,
    /// Base64-wrapped newline-delimited share links
    Base64UriList,
}

use log::debug;
use serde_json::Value;

use crate::models::{BodyKind, ProxyType, RawItem, SubscriptionItem, OUTBOUNDS_KEY};
use crate::parser::explodes::check_native;
use crate::settings::FilterSettings;
use crate::utils::base64::decode_lenient_str;

/// Items found in one subscription body
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSubscription {
    pub kind: BodyKind,
    pub items: Vec<SubscriptionItem>,
    /// Router-native entries filtered out as unsupported or informational
    pub dropped: usize,
}

const KNOWN_SCHEMES: &[ProxyType] = &[
    ProxyType::Shadowsocks,
    ProxyType::ShadowsocksR,
    ProxyType::VMess,
];

/// Split a subscription body into decodable items
///
/// Detection order:
/// 1. JSON document with an `outbounds` list (router-native form)
/// 2. Plain share links, when the body is a single line or starts with a
///    known scheme
/// 3. Base64-wrapped share links
/// 4. The raw body split on newlines, when nothing else matched
///
/// Each item keeps its position in the sequence, blank lines included, so
/// tags stay stable when a provider inserts empty lines.
pub fn parse_subscription(body: &str, filters: &FilterSettings) -> ParsedSubscription {
    if let Some(parsed) = parse_native(body, filters) {
        return parsed;
    }

    // A trailing newline still marks a multi-line (or base64) body
    let leading = body.trim_start();
    let trimmed = body.trim();
    if !leading.contains('\n') || starts_with_known_scheme(leading) {
        return uri_list(BodyKind::UriList, trimmed);
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    match decode_lenient_str(&compact) {
        Some(decoded) => uri_list(BodyKind::Base64UriList, &decoded),
        None => {
            debug!("Subscription body is neither JSON nor Base64, reading it line by line");
            uri_list(BodyKind::UriList, trimmed)
        }
    }
}

fn parse_native(body: &str, filters: &FilterSettings) -> Option<ParsedSubscription> {
    let json: Value = serde_json::from_str(body).ok()?;
    let outbounds = json.get(OUTBOUNDS_KEY)?.as_array()?;

    let mut items = Vec::new();
    let mut dropped = 0;
    for (index, outbound) in outbounds.iter().enumerate() {
        match check_native(outbound, filters) {
            Ok(()) => items.push(SubscriptionItem {
                index,
                raw: RawItem::Native(outbound.clone()),
            }),
            Err(e) => {
                debug!("Skipping native outbound #{}: {}", index, e);
                dropped += 1;
            }
        }
    }

    Some(ParsedSubscription {
        kind: BodyKind::Native,
        items,
        dropped,
    })
}

fn starts_with_known_scheme(text: &str) -> bool {
    KNOWN_SCHEMES.iter().any(|t| text.starts_with(t.scheme()))
}

fn uri_list(kind: BodyKind, text: &str) -> ParsedSubscription {
    let items = text
        .split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(SubscriptionItem {
                    index,
                    raw: RawItem::Uri(line.to_string()),
                })
            }
        })
        .collect();

    ParsedSubscription {
        kind,
        items,
        dropped: 0,
    }
}

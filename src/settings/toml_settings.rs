use serde::{Deserialize, Serialize};

use crate::classifier::CountryTables;
use crate::generator::EmitMode;
use crate::models::SubscriptionSource;
use crate::utils::IpFamily;

fn default_true() -> bool {
    true
}

fn default_output_dir() -> String {
    "configs".to_string()
}

fn default_outbound_file_prefix() -> String {
    "20_outbounds_".to_string()
}

fn default_selector_file() -> String {
    "30_outbounds_selectors.json".to_string()
}

fn default_routing_mark() -> Option<u32> {
    Some(255)
}

fn default_info_log_level() -> String {
    "info".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("subgen/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_lookup_url() -> String {
    "http://ip2location.default/info?ip={ip}".to_string()
}

fn default_country_field() -> String {
    "country_code".to_string()
}

fn default_geo_timeout() -> u64 {
    2
}

fn default_resolve_timeout() -> u64 {
    5
}

fn default_selector_countries() -> Vec<String> {
    vec!["JP".to_string()]
}

fn default_selector_tag_prefix() -> String {
    "Balancer".to_string()
}

fn default_test_url() -> String {
    "https://www.gstatic.com/generate_204".to_string()
}

fn default_interval() -> String {
    "1m".to_string()
}

fn default_tolerance() -> u32 {
    50
}

fn default_placeholder_keywords() -> Vec<String> {
    ["剩余流量", "过期时间", "最新域名"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_native_info_markers() -> Vec<String> {
    ["Traffic", "Expire", " G |", "Reset"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_native_types() -> Vec<String> {
    ["shadowsocks", "vmess", "trojan", "vless", "hysteria", "hysteria2"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Common settings section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_outbound_file_prefix")]
    pub outbound_file_prefix: String,
    #[serde(default = "default_selector_file")]
    pub selector_file: String,
    pub emit_mode: EmitMode,
    /// `SO_MARK` set on every URI-derived outbound; `None` leaves it out
    #[serde(default = "default_routing_mark")]
    pub routing_mark: Option<u32>,
    #[serde(default = "default_info_log_level")]
    pub log_level: String,
}

impl Default for CommonSettings {
    fn default() -> Self {
        CommonSettings {
            output_dir: default_output_dir(),
            outbound_file_prefix: default_outbound_file_prefix(),
            selector_file: default_selector_file(),
            emit_mode: EmitMode::default(),
            routing_mark: default_routing_mark(),
            log_level: default_info_log_level(),
        }
    }
}

/// Subscription download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// Skip TLS certificate validation on subscription GETs
    #[serde(default = "default_true")]
    pub insecure_skip_verify: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            timeout_secs: default_fetch_timeout(),
            insecure_skip_verify: true,
            user_agent: default_user_agent(),
        }
    }
}

/// Geolocation fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoSettings {
    /// Lookup URL, `{ip}` is replaced by the address
    #[serde(default = "default_lookup_url")]
    pub lookup_url: String,
    #[serde(default = "default_country_field")]
    pub country_field: String,
    #[serde(default = "default_geo_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_secs: u64,
    pub ip_family: IpFamily,
}

impl Default for GeoSettings {
    fn default() -> Self {
        GeoSettings {
            lookup_url: default_lookup_url(),
            country_field: default_country_field(),
            timeout_secs: default_geo_timeout(),
            resolve_timeout_secs: default_resolve_timeout(),
            ip_family: IpFamily::default(),
        }
    }
}

/// Failover group settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorSettings {
    /// Countries that get a url-test group
    #[serde(default = "default_selector_countries")]
    pub countries: Vec<String>,
    #[serde(default = "default_selector_tag_prefix")]
    pub tag_prefix: String,
    #[serde(default = "default_test_url")]
    pub url: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_tolerance")]
    pub tolerance: u32,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        SelectorSettings {
            countries: default_selector_countries(),
            tag_prefix: default_selector_tag_prefix(),
            url: default_test_url(),
            interval: default_interval(),
            tolerance: default_tolerance(),
        }
    }
}

/// Node filtering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Remark substrings marking provider info pseudo-nodes in share links
    #[serde(default = "default_placeholder_keywords")]
    pub placeholder_keywords: Vec<String>,
    /// Tag substrings marking info entries in router-native lists
    #[serde(default = "default_native_info_markers")]
    pub native_info_markers: Vec<String>,
    /// Router-native outbound types that are real proxies
    #[serde(default = "default_native_types")]
    pub native_types: Vec<String>,
    /// Reject vmess links carrying keys outside the known set
    pub strict_vmess_keys: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            placeholder_keywords: default_placeholder_keywords(),
            native_info_markers: default_native_info_markers(),
            native_types: default_native_types(),
            strict_vmess_keys: false,
        }
    }
}

impl FilterSettings {
    /// First placeholder keyword contained in `remark`, if any.
    pub fn placeholder_in<'a>(&'a self, remark: &str) -> Option<&'a str> {
        self.placeholder_keywords
            .iter()
            .map(String::as_str)
            .find(|kw| !kw.is_empty() && remark.contains(kw))
    }
}

/// Complete settings file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub common: CommonSettings,
    pub fetch: FetchSettings,
    pub geo: GeoSettings,
    pub selector: SelectorSettings,
    pub filters: FilterSettings,
    pub countries: CountryTables,
    pub subscriptions: Vec<SubscriptionSource>,
}

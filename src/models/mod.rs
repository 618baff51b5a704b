//! Core data models for the application
//!
//! This module contains the primary data structures used throughout the
//! application, separated from the logic that operates on them.
//!
//! # Usage
//!
//! ```rust
//! use subgen::models::{CanonicalNode, Credential};
//!
//! let node = CanonicalNode {
//!     display_text: "JP-test".to_string(),
//!     server: "1.2.3.4".to_string(),
//!     port: 8388,
//!     credential: Credential::Shadowsocks {
//!         method: "aes-256-gcm".to_string(),
//!         password: "pw".to_string(),
//!     },
//!     transport: None,
//! };
//! assert_eq!(node.proxy_type().outbound_type(), "shadowsocks");
//! ```

mod country;
mod outbound;
mod proxy;
pub mod proxy_group_config;
mod subscription;

pub use country::CountryCode;
pub use outbound::{OutboundConfigFile, OutboundEntry, OUTBOUNDS_KEY};
pub use proxy::*;
pub use proxy_group_config::{ProxyGroupType, SelectorEntry};
pub use subscription::{BodyKind, RawItem, SubscriptionItem, SubscriptionSource};

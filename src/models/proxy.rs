//! Proxy model definitions
//!
//! Contains the canonical node produced by every decoder, independent of the
//! wire encoding it came from.

/// Represents the type of a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    Shadowsocks,
    ShadowsocksR,
    VMess,
}

impl ProxyType {
    /// Outbound `type` name understood by the router.
    pub fn outbound_type(self) -> &'static str {
        match self {
            ProxyType::Shadowsocks => "shadowsocks",
            ProxyType::ShadowsocksR => "shadowsocksr",
            ProxyType::VMess => "vmess",
        }
    }

    /// URI scheme prefix that carries this proxy type.
    pub fn scheme(self) -> &'static str {
        match self {
            ProxyType::Shadowsocks => "ss://",
            ProxyType::ShadowsocksR => "ssr://",
            ProxyType::VMess => "vmess://",
        }
    }
}

/// Credential material, one variant per proxy type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Shadowsocks {
        method: String,
        /// For 2022 ciphers this holds every key joined with `:`
        password: String,
    },
    ShadowsocksR {
        method: String,
        password: String,
        protocol: String,
        protocol_param: String,
        obfs: String,
        obfs_param: String,
    },
    VMess {
        uuid: String,
        alter_id: u16,
    },
}

impl Credential {
    pub fn proxy_type(&self) -> ProxyType {
        match self {
            Credential::Shadowsocks { .. } => ProxyType::Shadowsocks,
            Credential::ShadowsocksR { .. } => ProxyType::ShadowsocksR,
            Credential::VMess { .. } => ProxyType::VMess,
        }
    }
}

/// Stream transport carried by VMess nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transport {
    /// `tcp`, `ws`, `h2`, `grpc`, ...
    pub network: String,
    pub tls: bool,
    pub path: String,
    /// Host header / SNI
    pub host: String,
    pub allow_insecure: bool,
}

/// A fully decoded proxy endpoint.
///
/// Decoders build it in one go; there is no partially filled state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalNode {
    /// Remark shown by the provider, used for classification
    pub display_text: String,
    pub server: String,
    pub port: u16,
    pub credential: Credential,
    pub transport: Option<Transport>,
}

impl CanonicalNode {
    pub fn proxy_type(&self) -> ProxyType {
        self.credential.proxy_type()
    }
}

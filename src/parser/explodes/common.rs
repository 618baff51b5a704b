use crate::models::{CanonicalNode, ProxyType};
use crate::parser::types::{preview, DecodeContext};
use crate::parser::DecodeError;

use super::{ss::explode_ss, ssr::explode_ssr, vmess::explode_vmess};

type Decoder = fn(&str, &DecodeContext) -> Result<CanonicalNode, DecodeError>;

/// Scheme prefix to decoder table
const DECODERS: &[(ProxyType, Decoder)] = &[
    (ProxyType::ShadowsocksR, explode_ssr),
    (ProxyType::Shadowsocks, explode_ss),
    (ProxyType::VMess, explode_vmess),
];

/// Explode a share link into a canonical node
///
/// This function looks up the decoder by scheme prefix and hands the link over.
pub fn explode(link: &str, ctx: &DecodeContext) -> Result<CanonicalNode, DecodeError> {
    let link = link.trim();

    DECODERS
        .iter()
        .find(|(proxy_type, _)| link.starts_with(proxy_type.scheme()))
        .map(|(_, decoder)| decoder(link, ctx))
        .unwrap_or_else(|| Err(DecodeError::UnknownScheme(preview(link))))
}

/// Strips `prefix` from `link`, failing with the scheme error the dispatcher
/// would have produced.
pub(crate) fn strip_scheme<'a>(link: &'a str, prefix: &str) -> Result<&'a str, DecodeError> {
    link.trim()
        .strip_prefix(prefix)
        .ok_or_else(|| DecodeError::UnknownScheme(preview(link)))
}

/// Splits `host:port`, accepting bracketed IPv6 hosts.
pub(crate) fn split_host_port(host_port: &str) -> Result<(String, u16), DecodeError> {
    let (host, port) = host_port
        .rsplit_once(':')
        .ok_or_else(|| DecodeError::MalformedUri(format!("missing port in {}", host_port)))?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(DecodeError::MalformedUri(format!(
            "missing host in {}",
            host_port
        )));
    }

    Ok((host.to_string(), parse_port(port)?))
}

/// Parses a non-zero port.
pub(crate) fn parse_port(port: &str) -> Result<u16, DecodeError> {
    match port.trim().parse::<u16>() {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(DecodeError::InvalidPort(port.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::FilterSettings;

    #[test]
    fn test_explode_dispatch() {
        let filters = FilterSettings::default();
        let ctx = DecodeContext::new("test", &filters);

        let node = explode("ss://YWVzLTI1Ni1nY206cHc=@1.2.3.4:8388#JP-test", &ctx).unwrap();
        assert_eq!(node.proxy_type(), ProxyType::Shadowsocks);

        assert!(matches!(
            explode("trojan://pw@1.2.3.4:443", &ctx),
            Err(DecodeError::UnknownScheme(_))
        ));
        assert!(matches!(
            explode("", &ctx),
            Err(DecodeError::UnknownScheme(_))
        ));
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(
            split_host_port("1.2.3.4:8388").unwrap(),
            ("1.2.3.4".to_string(), 8388)
        );
        assert_eq!(
            split_host_port("[2001:db8::1]:443").unwrap(),
            ("2001:db8::1".to_string(), 443)
        );
        assert!(matches!(
            split_host_port("1.2.3.4"),
            Err(DecodeError::MalformedUri(_))
        ));
        assert!(matches!(
            split_host_port("1.2.3.4:0"),
            Err(DecodeError::InvalidPort(_))
        ));
        assert!(matches!(
            split_host_port("1.2.3.4:http"),
            Err(DecodeError::InvalidPort(_))
        ));
    }
}

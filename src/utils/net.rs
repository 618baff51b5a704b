//! Host resolution used by the country classifier.

use std::net::{IpAddr, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Address family the resolver is allowed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    Any,
    #[default]
    Ipv4,
    Ipv6,
}

impl IpFamily {
    pub fn accepts(self, ip: &IpAddr) -> bool {
        match self {
            IpFamily::Any => true,
            IpFamily::Ipv4 => ip.is_ipv4(),
            IpFamily::Ipv6 => ip.is_ipv6(),
        }
    }
}

/// Resolver settings handed to the classifier instead of patching the
/// process-wide network stack.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub family: IpFamily,
    /// Upper bound on one lookup. A lookup that overruns it leaves its
    /// helper thread blocked in `getaddrinfo` until the system gives up,
    /// which a batch run tolerates since the process exits afterwards.
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            family: IpFamily::Ipv4,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Turns a hostname into one IP address.
pub trait Resolve {
    fn resolve(&self, host: &str) -> Result<IpAddr, String>;
}

/// Resolver backed by the system `getaddrinfo`.
///
/// `getaddrinfo` has no timeout of its own, so the lookup runs on a helper
/// thread and is abandoned once `timeout` elapses.
pub struct SystemResolver {
    config: ResolverConfig,
}

impl SystemResolver {
    pub fn new(config: ResolverConfig) -> Self {
        SystemResolver { config }
    }
}

impl Resolve for SystemResolver {
    fn resolve(&self, host: &str) -> Result<IpAddr, String> {
        let (tx, rx) = mpsc::channel();
        let target = host.to_string();
        thread::spawn(move || {
            let result = (target.as_str(), 0u16)
                .to_socket_addrs()
                .map(|addrs| addrs.map(|a| a.ip()).collect::<Vec<_>>());
            // The receiver may already have timed out
            let _ = tx.send(result);
        });

        let addrs = match rx.recv_timeout(self.config.timeout) {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => return Err(format!("failed to resolve {}: {}", host, e)),
            Err(_) => {
                return Err(format!(
                    "resolving {} timed out after {:?}",
                    host, self.config.timeout
                ))
            }
        };

        addrs
            .into_iter()
            .find(|ip| self.config.family.accepts(ip))
            .ok_or_else(|| format!("no {:?} address for {}", self.config.family, host))
    }
}

/// Parses `addr` as a literal IP address, accepting bracketed IPv6.
pub fn parse_ip(addr: &str) -> Option<IpAddr> {
    addr.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("1.2.3.4"), Some("1.2.3.4".parse().unwrap()));
        assert_eq!(parse_ip("[2001:db8::1]"), Some("2001:db8::1".parse().unwrap()));
        assert_eq!(parse_ip("jp1.example.com"), None);
    }

    #[test]
    fn test_family_filter() {
        let v4: IpAddr = "1.2.3.4".parse().unwrap();
        let v6: IpAddr = "::1".parse().unwrap();
        assert!(IpFamily::Any.accepts(&v4) && IpFamily::Any.accepts(&v6));
        assert!(IpFamily::Ipv4.accepts(&v4) && !IpFamily::Ipv4.accepts(&v6));
        assert!(IpFamily::Ipv6.accepts(&v6) && !IpFamily::Ipv6.accepts(&v4));
    }

    #[test]
    fn test_system_resolver_literal() {
        let resolver = SystemResolver::new(ResolverConfig::default());
        assert_eq!(
            resolver.resolve("127.0.0.1").unwrap(),
            "127.0.0.1".parse::<IpAddr>().unwrap()
        );
    }
}

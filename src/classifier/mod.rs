//! Country classification of decoded nodes.
//!
//! Three tiers, each tried only when the previous one found nothing:
//! flag glyphs in the remark, country names in the remark, and finally a
//! geolocation lookup of the server address. The last tier never fails
//! outward; any problem there yields [`CountryCode::unknown`].

pub mod geo;
pub mod tables;

use std::collections::HashSet;

use log::{debug, warn};
use thiserror::Error;

use crate::models::CountryCode;
use crate::utils::net::parse_ip;
use crate::utils::Resolve;

pub use geo::{GeoLookup, HttpGeoLookup};
pub use tables::{CountryName, CountryTables};

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Resolution failed: {0}")]
    Resolve(String),

    #[error("Geolocation lookup for {0} timed out")]
    Timeout(String),

    #[error("Geolocation request failed: {0}")]
    Http(String),

    #[error("Geolocation service returned HTTP {0}")]
    Status(u16),

    #[error("Unusable geolocation response: {0}")]
    Body(String),
}

/// Which tier produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Flag,
    Name,
    Geo,
}

pub struct CountryClassifier {
    flag_codes: HashSet<String>,
    names: Vec<(String, CountryCode)>,
    resolver: Box<dyn Resolve>,
    geo: Box<dyn GeoLookup>,
}

impl CountryClassifier {
    pub fn new(tables: &CountryTables, resolver: Box<dyn Resolve>, geo: Box<dyn GeoLookup>) -> Self {
        let names = tables
            .names
            .iter()
            .filter_map(|entry| {
                CountryCode::new(&entry.code).map(|code| (entry.name.clone(), code))
            })
            .collect();

        CountryClassifier {
            flag_codes: tables
                .flag_codes
                .iter()
                .map(|c| c.to_ascii_uppercase())
                .collect(),
            names,
            resolver,
            geo,
        }
    }

    /// Classifies a node by its server address and display text.
    pub fn classify(&self, server: &str, display_text: &str) -> CountryCode {
        self.classify_with_tier(server, display_text).0
    }

    pub fn classify_with_tier(&self, server: &str, display_text: &str) -> (CountryCode, Tier) {
        if let Some(code) = self.country_from_flags(display_text) {
            return (code, Tier::Flag);
        }
        if let Some(code) = self.country_from_name(display_text) {
            return (code, Tier::Name);
        }

        match self.country_from_geo(server) {
            Ok(code) => (code, Tier::Geo),
            Err(e) => {
                warn!("Failed to get country for {}: {}", server, e);
                (CountryCode::unknown(), Tier::Geo)
            }
        }
    }

    /// Tier 1: the first recognised pair of regional indicator glyphs.
    pub fn country_from_flags(&self, text: &str) -> Option<CountryCode> {
        let letters: Vec<Option<char>> = text.chars().map(tables::regional_letter).collect();

        let mut i = 0;
        while i + 1 < letters.len() {
            match (letters[i], letters[i + 1]) {
                (Some(a), Some(b)) => {
                    let code: String = [a, b].iter().collect();
                    if self.flag_codes.contains(&code) {
                        return CountryCode::new(&code);
                    }
                    i += 2;
                }
                _ => i += 1,
            }
        }
        None
    }

    /// Tier 2: the first table entry, in table order, contained in the text.
    ///
    /// Two-letter ASCII entries such as `US` only match when no other letter
    /// touches them, so `AUS 01` is left to the next tier.
    pub fn country_from_name(&self, text: &str) -> Option<CountryCode> {
        self.names
            .iter()
            .find(|(name, _)| name_matches(text, name))
            .map(|(_, code)| code.clone())
    }

    /// Tier 3: resolve the server if needed, then ask the geolocation service.
    fn country_from_geo(&self, server: &str) -> Result<CountryCode, ClassifyError> {
        let ip = match parse_ip(server) {
            Some(ip) => ip,
            None => {
                let ip = self
                    .resolver
                    .resolve(server)
                    .map_err(ClassifyError::Resolve)?;
                debug!("Resolved {} to {}", server, ip);
                ip
            }
        };

        let raw = self.geo.lookup(ip)?;
        // ip2location answers "-" for addresses it cannot place
        Ok(CountryCode::new(&raw).unwrap_or_else(CountryCode::unknown))
    }
}

fn name_matches(text: &str, name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if !is_bare_code(name) {
        return text.contains(name);
    }
    text.match_indices(name).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + name.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphabetic())
            && !after.is_some_and(|c| c.is_ascii_alphabetic())
    })
}

fn is_bare_code(name: &str) -> bool {
    name.len() == 2 && name.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::net::IpAddr;
    use std::rc::Rc;

    struct FixedResolver(Rc<RefCell<Vec<String>>>);

    impl Resolve for FixedResolver {
        fn resolve(&self, host: &str) -> Result<IpAddr, String> {
            self.0.borrow_mut().push(host.to_string());
            if host.ends_with(".invalid") {
                Err(format!("no such host {}", host))
            } else {
                Ok("9.9.9.9".parse().unwrap())
            }
        }
    }

    struct FixedGeo(Result<&'static str, u16>, Rc<RefCell<Vec<IpAddr>>>);

    impl GeoLookup for FixedGeo {
        fn lookup(&self, ip: IpAddr) -> Result<String, ClassifyError> {
            self.1.borrow_mut().push(ip);
            match self.0 {
                Ok(code) => Ok(code.to_string()),
                Err(status) => Err(ClassifyError::Status(status)),
            }
        }
    }

    fn classifier(
        geo_answer: Result<&'static str, u16>,
    ) -> (CountryClassifier, Rc<RefCell<Vec<String>>>, Rc<RefCell<Vec<IpAddr>>>) {
        let resolved = Rc::new(RefCell::new(Vec::new()));
        let looked_up = Rc::new(RefCell::new(Vec::new()));
        let c = CountryClassifier::new(
            &CountryTables::default(),
            Box::new(FixedResolver(resolved.clone())),
            Box::new(FixedGeo(geo_answer, looked_up.clone())),
        );
        (c, resolved, looked_up)
    }

    #[test]
    fn test_flag_beats_name() {
        let (c, _, looked_up) = classifier(Ok("US"));
        let (code, tier) = c.classify_with_tier("1.2.3.4", "🇯🇵 Germany 01");
        assert_eq!(code.as_str(), "JP");
        assert_eq!(tier, Tier::Flag);
        assert!(looked_up.borrow().is_empty());
    }

    #[test]
    fn test_unrecognised_flag_falls_through() {
        let (c, _, _) = classifier(Ok("US"));
        // 🇿🇿 is not a known code, the name tier decides
        assert_eq!(c.classify("1.2.3.4", "🇿🇿 Germany").as_str(), "DE");
    }

    #[test]
    fn test_flag_pairs_are_aligned() {
        let (c, _, _) = classifier(Ok("US"));
        // 🇺🇸🇯🇵 must read as US then JP, never as S+J
        assert_eq!(c.country_from_flags("🇺🇸🇯🇵").unwrap().as_str(), "US");
        assert!(c.country_from_flags("🇯 alone").is_none());
    }

    #[test]
    fn test_name_table_order() {
        let (c, _, _) = classifier(Ok("US"));
        assert_eq!(c.classify("1.2.3.4", "JP-test").as_str(), "JP");
        assert_eq!(c.classify("1.2.3.4", "香港 01").as_str(), "HK");
        assert_eq!(c.classify("1.2.3.4", "United Kingdom 02").as_str(), "GB");
        assert_eq!(c.classify("1.2.3.4", "Indonesia").as_str(), "ID");
    }

    #[test]
    fn test_bare_codes_need_letter_boundaries() {
        let (c, _, looked_up) = classifier(Ok("AU"));
        let (code, tier) = c.classify_with_tier("1.2.3.4", "AUS 01");
        assert_eq!(code.as_str(), "AU");
        assert_eq!(tier, Tier::Geo);
        assert_eq!(looked_up.borrow().len(), 1);

        assert!(c.country_from_name("RUS-02").is_none());
        assert!(c.country_from_name("UKRAINE").is_none());
        assert_eq!(c.country_from_name("HK01").unwrap().as_str(), "HK");
        assert_eq!(c.country_from_name("[SG] edge").unwrap().as_str(), "SG");
        assert_eq!(c.country_from_name("relay US").unwrap().as_str(), "US");
        // A later standalone occurrence still counts
        assert_eq!(c.country_from_name("AUS / US").unwrap().as_str(), "US");
    }

    #[test]
    fn test_geo_for_ip_skips_resolution() {
        let (c, resolved, looked_up) = classifier(Ok("sg"));
        let (code, tier) = c.classify_with_tier("8.8.4.4", "node 7");
        assert_eq!(code.as_str(), "SG");
        assert_eq!(tier, Tier::Geo);
        assert!(resolved.borrow().is_empty());
        assert_eq!(looked_up.borrow()[0], "8.8.4.4".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_geo_for_hostname_resolves_first() {
        let (c, resolved, looked_up) = classifier(Ok("NL"));
        assert_eq!(c.classify("edge.example.com", "node 7").as_str(), "NL");
        assert_eq!(*resolved.borrow(), vec!["edge.example.com".to_string()]);
        assert_eq!(looked_up.borrow()[0], "9.9.9.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_geo_failures_degrade_to_unknown() {
        let (c, _, _) = classifier(Err(503));
        assert!(c.classify("8.8.4.4", "node").is_unknown());

        let (c, _, looked_up) = classifier(Ok("JP"));
        assert!(c.classify("gone.invalid", "node").is_unknown());
        assert!(looked_up.borrow().is_empty());

        let (c, _, _) = classifier(Ok("-"));
        assert!(c.classify("8.8.4.4", "node").is_unknown());
    }

    #[test]
    fn test_injected_tables() {
        let tables = CountryTables {
            flag_codes: vec![],
            names: vec![CountryName {
                name: "Tokyo".to_string(),
                code: "JP".to_string(),
            }],
        };
        let c = CountryClassifier::new(
            &tables,
            Box::new(FixedResolver(Rc::new(RefCell::new(Vec::new())))),
            Box::new(FixedGeo(Ok("US"), Rc::new(RefCell::new(Vec::new())))),
        );
        assert_eq!(c.classify("1.2.3.4", "Tokyo 01").as_str(), "JP");
        // Flags are not recognised with an empty flag table
        assert_eq!(c.classify("1.2.3.4", "🇯🇵 node").as_str(), "US");
    }
}

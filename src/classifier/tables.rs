//! Lookup tables driving the first two classification tiers.

use serde::{Deserialize, Serialize};

/// First regional indicator symbol, `🇦`.
pub const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;
/// Last regional indicator symbol, `🇿`.
pub const REGIONAL_INDICATOR_Z: u32 = 0x1F1FF;

/// One entry of the name table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    pub name: String,
    pub code: String,
}

/// Flag and name tables for the classifier.
///
/// `names` is order sensitive: the first entry contained in a remark wins,
/// so longer or more specific names must come before anything they contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryTables {
    /// Codes whose flag glyph pair is recognised
    pub flag_codes: Vec<String>,
    pub names: Vec<CountryName>,
}

const DEFAULT_FLAG_CODES: &[&str] = &[
    "HK", "TW", "JP", "SG", "US", "GB", "DE", "FR", "CA", "AU", "KR", "NL", "CH", "SE", "RU",
    "IN", "BR", "AR", "CL", "AE", "TR", "ID", "IE", "AT", "BG", "HU", "TH", "MY",
];

const DEFAULT_NAMES: &[(&str, &str)] = &[
    ("美国", "US"),
    ("德国", "DE"),
    ("英国", "GB"),
    ("日本", "JP"),
    ("香港", "HK"),
    ("台湾", "TW"),
    ("韩国", "KR"),
    ("印度", "IN"),
    ("泰国", "TH"),
    ("马来西亚", "MY"),
    ("新加坡", "SG"),
    ("Hong Kong", "HK"),
    ("USA", "US"),
    ("United States", "US"),
    ("Japan", "JP"),
    ("Korea", "KR"),
    ("Singapore", "SG"),
    ("Taiwan", "TW"),
    ("Germany", "DE"),
    ("United Kingdom", "GB"),
    ("France", "FR"),
    ("Netherlands", "NL"),
    ("Russia", "RU"),
    ("Switzerland", "CH"),
    ("Sweden", "SE"),
    ("Austria", "AT"),
    ("Bulgaria", "BG"),
    ("Ireland", "IE"),
    ("Turkey", "TR"),
    ("Hungary", "HU"),
    ("Thailand", "TH"),
    ("Malaysia", "MY"),
    ("India", "IN"),
    ("Australia", "AU"),
    ("United Arab Emirates", "AE"),
    ("Indonesia", "ID"),
    ("Brazil", "BR"),
    ("Argentina", "AR"),
    ("Chile", "CL"),
    ("Canada", "CA"),
    ("UAE", "AE"),
    ("UK", "GB"),
    // Bare codes last, after every full name that could contain them
    ("HK", "HK"),
    ("TW", "TW"),
    ("JP", "JP"),
    ("SG", "SG"),
    ("KR", "KR"),
    ("US", "US"),
];

impl Default for CountryTables {
    fn default() -> Self {
        CountryTables {
            flag_codes: DEFAULT_FLAG_CODES.iter().map(|c| c.to_string()).collect(),
            names: DEFAULT_NAMES
                .iter()
                .map(|(name, code)| CountryName {
                    name: name.to_string(),
                    code: code.to_string(),
                })
                .collect(),
        }
    }
}

/// Decodes one regional indicator glyph into its ASCII letter.
pub fn regional_letter(c: char) -> Option<char> {
    let cp = c as u32;
    if (REGIONAL_INDICATOR_A..=REGIONAL_INDICATOR_Z).contains(&cp) {
        char::from_u32('A' as u32 + (cp - REGIONAL_INDICATOR_A))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regional_letter() {
        assert_eq!(regional_letter('\u{1F1EF}'), Some('J'));
        assert_eq!(regional_letter('\u{1F1F5}'), Some('P'));
        assert_eq!(regional_letter('J'), None);
    }

    #[test]
    fn test_default_tables_are_codes() {
        let tables = CountryTables::default();
        assert!(tables.flag_codes.iter().all(|c| c.len() == 2));
        assert!(tables.names.iter().all(|n| n.code.len() == 2));
        // Full names precede the bare codes they contain
        let pos = |name: &str| tables.names.iter().position(|n| n.name == name).unwrap();
        assert!(pos("USA") < pos("US"));
        assert!(pos("United Kingdom") < pos("UK"));
    }
}

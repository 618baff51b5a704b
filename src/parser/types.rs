use crate::settings::FilterSettings;

/// Everything a decoder needs beyond the link itself.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Name of the subscription the link came from
    pub subscription_name: &'a str,
    pub filters: &'a FilterSettings,
}

impl<'a> DecodeContext<'a> {
    pub fn new(subscription_name: &'a str, filters: &'a FilterSettings) -> Self {
        DecodeContext {
            subscription_name,
            filters,
        }
    }
}

/// Shortens a raw item for error messages and logs.
pub fn preview(raw: &str) -> String {
    const MAX_CHARS: usize = 32;
    let mut out: String = raw.chars().take(MAX_CHARS).collect();
    if raw.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("ss://abc"), "ss://abc");
        let long = format!("vmess://{}", "A".repeat(100));
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 35);
    }
}

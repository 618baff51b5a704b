pub mod toml_settings;

use std::path::Path;

use log::info;
use thiserror::Error;

use crate::utils::file_get;

pub use toml_settings::{
    CommonSettings, FetchSettings, FilterSettings, GeoSettings, SelectorSettings, Settings,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Format of a settings document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Yaml,
}

impl SettingsFormat {
    /// Picks the format from the file extension, TOML unless it says YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => SettingsFormat::Yaml,
            _ => SettingsFormat::Toml,
        }
    }
}

/// Parses settings from a string and validates them.
pub fn settings_from_content(
    content: &str,
    format: SettingsFormat,
) -> Result<Settings, SettingsError> {
    let settings: Settings = match format {
        SettingsFormat::Toml => toml::from_str(content)?,
        SettingsFormat::Yaml => serde_yaml::from_str(content)?,
    };
    validate(&settings)?;
    Ok(settings)
}

/// Loads settings from a TOML or YAML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = file_get(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let settings = settings_from_content(&content, SettingsFormat::from_path(path))?;
    info!(
        "Loaded settings from {} with {} subscription(s)",
        path.display(),
        settings.subscriptions.len()
    );
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if !settings.geo.lookup_url.contains("{ip}") {
        return Err(SettingsError::Invalid(format!(
            "geo.lookup_url must contain an {{ip}} placeholder: {}",
            settings.geo.lookup_url
        )));
    }

    if settings.common.outbound_file_prefix.is_empty() {
        return Err(SettingsError::Invalid(
            "common.outbound_file_prefix must not be empty".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for sub in &settings.subscriptions {
        if sub.name.is_empty() || sub.url.is_empty() {
            return Err(SettingsError::Invalid(format!(
                "subscription #{} needs both a name and a url",
                sub.index
            )));
        }
        if !seen.insert(sub.name.as_str()) {
            return Err(SettingsError::Invalid(format!(
                "duplicate subscription name: {}",
                sub.name
            )));
        }
    }

    for code in settings
        .countries
        .flag_codes
        .iter()
        .chain(settings.countries.names.iter().map(|n| &n.code))
        .chain(settings.selector.countries.iter())
    {
        if crate::models::CountryCode::new(code).is_none() {
            return Err(SettingsError::Invalid(format!(
                "not a two-letter country code: {}",
                code
            )));
        }
    }

    Ok(())
}

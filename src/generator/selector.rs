use std::path::PathBuf;

use linked_hash_map::LinkedHashMap;
use log::{debug, info};
use serde_json::json;

use crate::models::{CountryCode, OutboundConfigFile, SelectorEntry};
use crate::settings::SelectorSettings;

use super::emitter::{load_document, write_document};
use super::EmitError;

/// Tag of the failover group for `country`, e.g. `BalancerJP`.
pub fn selector_tag(prefix: &str, country: &CountryCode) -> String {
    format!("{}{}", prefix, country)
}

/// Inserts `entry` into `doc`, or refreshes the member list of the entry
/// already carrying its tag.
///
/// Other fields of an existing entry, and every other entry, are left as
/// they are. Returns `true` when an existing entry was updated.
pub fn upsert_selector(
    doc: &mut OutboundConfigFile,
    entry: &SelectorEntry,
) -> serde_json::Result<bool> {
    if let Some(pos) = doc.position_of(&entry.tag) {
        if let Some(existing) = doc.outbounds[pos].as_object_mut() {
            existing.insert("outbounds".to_string(), json!(entry.outbounds));
            return Ok(true);
        }
    }
    doc.outbounds.push(serde_json::to_value(entry)?);
    Ok(false)
}

/// Result of one selector upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorUpdate {
    pub tag: String,
    pub members: usize,
    /// Whether an existing entry was refreshed rather than added
    pub replaced: bool,
}

/// Maintains the selector document for the tracked countries
#[derive(Debug, Clone)]
pub struct SelectorUpdater {
    path: PathBuf,
    settings: SelectorSettings,
}

impl SelectorUpdater {
    pub fn new(path: impl Into<PathBuf>, settings: &SelectorSettings) -> Self {
        SelectorUpdater {
            path: path.into(),
            settings: settings.clone(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Countries that get a failover group, ignoring invalid codes.
    pub fn tracked(&self) -> Vec<CountryCode> {
        self.settings
            .countries
            .iter()
            .filter_map(|c| CountryCode::new(c))
            .collect()
    }

    /// Upserts one group per tracked country and writes the document back
    ///
    /// # Arguments
    ///
    /// * `members` - Tags produced by this run, per country
    ///
    /// A tracked country without members keeps whatever entry it already
    /// has. Nothing is written when no tracked country has members.
    pub fn update(
        &self,
        members: &LinkedHashMap<CountryCode, Vec<String>>,
    ) -> Result<Vec<SelectorUpdate>, EmitError> {
        let mut updates = Vec::new();
        let mut doc: Option<OutboundConfigFile> = None;

        for country in self.tracked() {
            let tags = match members.get(&country) {
                Some(tags) if !tags.is_empty() => tags,
                _ => {
                    info!(
                        "No {} nodes in this run, selector left untouched",
                        country
                    );
                    continue;
                }
            };

            if doc.is_none() {
                doc = Some(load_document(&self.path)?);
            }
            let Some(current) = doc.as_mut() else { continue };

            let entry = SelectorEntry::url_test(
                selector_tag(&self.settings.tag_prefix, &country),
                tags.clone(),
                &self.settings.url,
                &self.settings.interval,
                self.settings.tolerance,
            );
            debug!("Upserting {} group {}", entry.type_str(), entry.tag);
            let replaced = upsert_selector(current, &entry).map_err(|source| EmitError::Json {
                path: self.path.clone(),
                source,
            })?;

            info!("Updated selector {} with {} nodes", entry.tag, tags.len());
            updates.push(SelectorUpdate {
                tag: entry.tag,
                members: tags.len(),
                replaced,
            });
        }

        if let Some(doc) = doc {
            write_document(&self.path, &doc)?;
        }
        Ok(updates)
    }
}

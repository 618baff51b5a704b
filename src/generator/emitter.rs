use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::models::{CountryCode, OutboundConfigFile, OutboundEntry};
use crate::utils::file::{file_write, list_files_with, to_pretty_json};
use crate::utils::file_get;

use super::{CountryBuckets, EmitError, EmitMode};

const JSON_SUFFIX: &str = ".json";

/// Writes country buckets into `{output_dir}/{prefix}{cc}.json` documents.
#[derive(Debug, Clone)]
pub struct ConfigEmitter {
    output_dir: PathBuf,
    prefix: String,
    mode: EmitMode,
}

impl ConfigEmitter {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: &str, mode: EmitMode) -> Self {
        ConfigEmitter {
            output_dir: output_dir.into(),
            prefix: prefix.to_string(),
            mode,
        }
    }

    pub fn mode(&self) -> EmitMode {
        self.mode
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the document holding `country`'s outbounds.
    pub fn country_file(&self, country: &CountryCode) -> PathBuf {
        self.output_dir.join(format!(
            "{}{}{}",
            self.prefix,
            country.file_key(),
            JSON_SUFFIX
        ))
    }

    /// Deletes every country document in the output directory.
    ///
    /// Only acts in [`EmitMode::Reset`]; returns the number of files removed.
    pub fn reset(&self) -> Result<usize, EmitError> {
        if self.mode != EmitMode::Reset {
            return Ok(0);
        }

        let files = list_files_with(&self.output_dir, &self.prefix, JSON_SUFFIX).map_err(
            |source| EmitError::Io {
                path: self.output_dir.clone(),
                source,
            },
        )?;
        for file in &files {
            fs::remove_file(file).map_err(|source| EmitError::Io {
                path: file.clone(),
                source,
            })?;
            info!("Deleted {}", file.display());
        }
        Ok(files.len())
    }

    /// Merges `entries` into the country's document and writes it back.
    pub fn emit_country(
        &self,
        country: &CountryCode,
        entries: &[OutboundEntry],
    ) -> Result<PathBuf, EmitError> {
        let path = self.country_file(country);
        let mut doc = load_document(&path)?;

        for entry in entries {
            match self.mode {
                EmitMode::Dedup => match doc.position_of(&entry.tag) {
                    Some(pos) => doc.outbounds[pos] = entry.body.clone(),
                    None => doc.outbounds.push(entry.body.clone()),
                },
                EmitMode::Append | EmitMode::Reset => doc.outbounds.push(entry.body.clone()),
            }
        }

        write_document(&path, &doc)?;
        info!("Updated {} with {} nodes", path.display(), entries.len());
        Ok(path)
    }

    /// Emits every bucket in first-seen order.
    ///
    /// A failure only affects its own country; documents already written
    /// stay written.
    pub fn emit(&self, buckets: &CountryBuckets) -> Vec<(CountryCode, Result<PathBuf, EmitError>)> {
        buckets
            .iter()
            .map(|(country, entries)| {
                let result = self.emit_country(country, entries);
                if let Err(e) = &result {
                    warn!("Failed to emit outbounds for {}: {}", country, e);
                }
                (country.clone(), result)
            })
            .collect()
    }
}

/// Reads an outbound document
///
/// A missing file yields an empty document. So does a corrupt one, with a
/// warning, since a previous run may have been interrupted mid-write.
pub fn load_document(path: &Path) -> Result<OutboundConfigFile, EmitError> {
    let content = match file_get(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(OutboundConfigFile::default()),
        Err(source) => {
            return Err(EmitError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_str(&content) {
        Ok(doc) => Ok(doc),
        Err(e) => {
            warn!(
                "Ignoring unreadable document {}: {}",
                path.display(),
                e
            );
            Ok(OutboundConfigFile::default())
        }
    }
}

/// Writes a document pretty-printed, overwriting whatever was there.
pub fn write_document(path: &Path, doc: &OutboundConfigFile) -> Result<(), EmitError> {
    let content = to_pretty_json(doc).map_err(|source| EmitError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    file_write(path, &content).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

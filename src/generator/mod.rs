//! Outbound generation
//!
//! Turns decoded nodes into tagged router outbounds, groups them by country
//! and writes the per-country documents and the selector document.

pub mod emitter;
pub mod outbound;
pub mod selector;
pub mod tag;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use emitter::ConfigEmitter;
pub use outbound::{native_to_outbound, node_to_outbound};
pub use selector::{selector_tag, upsert_selector, SelectorUpdate, SelectorUpdater};
pub use tag::{node_tag, CountryBuckets, NODE_PREFIX};

/// How new entries are merged into an existing country document
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum EmitMode {
    /// Append every entry; running twice duplicates the batch
    #[default]
    Append,
    /// Delete all country documents once at the start of the run, then append
    Reset,
    /// Replace an existing entry carrying the same tag instead of appending
    Dedup,
}

/// Errors raised while reading or writing an output document
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot serialize {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl EmitError {
    pub fn path(&self) -> &PathBuf {
        match self {
            EmitError::Io { path, .. } | EmitError::Json { path, .. } => path,
        }
    }
}

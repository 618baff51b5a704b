pub mod classifier;
pub mod generator;
pub mod interfaces;
pub mod models;
pub mod parser;
pub mod settings;
pub mod utils;

// Re-export the main node types for easier access
pub use models::{CanonicalNode, CountryCode, Credential, ProxyType};

// Re-export the batch entry points
pub use interfaces::{Generator, RunReport};
pub use settings::{load_settings, Settings};

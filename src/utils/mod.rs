pub mod base64;
pub mod file;
pub mod http;
pub mod net;
pub mod url;

// Re-export common utilities
pub use file::file_get;
pub use http::{FetchError, HttpFetcher, SubscriptionFetcher};
pub use net::{IpFamily, Resolve, ResolverConfig, SystemResolver};

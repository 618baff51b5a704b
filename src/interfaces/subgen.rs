use std::path::PathBuf;
use std::time::Duration;

use linked_hash_map::LinkedHashMap;
use log::{debug, error, info, warn};
use serde_json::Value;
use thiserror::Error;

use crate::classifier::{ClassifyError, CountryClassifier, HttpGeoLookup};
use crate::generator::{
    native_to_outbound, node_tag, node_to_outbound, CountryBuckets, ConfigEmitter, EmitError,
    SelectorUpdate, SelectorUpdater,
};
use crate::models::{
    BodyKind, CountryCode, OutboundEntry, RawItem, SubscriptionItem, SubscriptionSource,
};
use crate::parser::types::preview;
use crate::parser::{explode, parse_subscription, DecodeContext};
use crate::settings::Settings;
use crate::utils::{
    FetchError, HttpFetcher, ResolverConfig, SubscriptionFetcher, SystemResolver,
};

/// A subscription that could not be processed at all
#[derive(Error, Debug)]
#[error("Subscription {name}: {source}")]
pub struct SubscriptionError {
    pub name: String,
    #[source]
    pub source: FetchError,
}

/// Errors building the default collaborators
#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// What happened to one subscription
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionReport {
    pub name: String,
    pub kind: Option<BodyKind>,
    /// Non-blank items found in the body
    pub items: usize,
    /// Outbounds produced
    pub nodes: usize,
    /// Provider info entries dropped on purpose
    pub placeholders: usize,
    /// Items rejected by a decoder or as unsupported
    pub rejected: usize,
}

/// Summary of a whole batch run
#[derive(Debug, Default)]
pub struct RunReport {
    pub subscriptions: Vec<SubscriptionReport>,
    pub failures: Vec<SubscriptionError>,
    /// Country documents removed before emitting
    pub removed_files: usize,
    /// Distinct country documents written
    pub files_written: Vec<PathBuf>,
    pub emit_errors: Vec<EmitError>,
    pub selectors: Vec<SelectorUpdate>,
}

impl RunReport {
    /// Whether every subscription and every write went through.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.emit_errors.is_empty()
    }

    pub fn total_nodes(&self) -> usize {
        self.subscriptions.iter().map(|s| s.nodes).sum()
    }
}

enum ItemOutcome {
    Node(CountryCode, OutboundEntry),
    Placeholder,
    Rejected,
}

/// Batch driver: fetch, decode, classify, tag and emit
pub struct Generator {
    settings: Settings,
    classifier: CountryClassifier,
    fetcher: Box<dyn SubscriptionFetcher>,
}

impl Generator {
    pub fn new(
        settings: Settings,
        classifier: CountryClassifier,
        fetcher: Box<dyn SubscriptionFetcher>,
    ) -> Self {
        Generator {
            settings,
            classifier,
            fetcher,
        }
    }

    /// Builds a generator with the HTTP fetcher, the system resolver and
    /// the HTTP geolocation service configured in `settings`.
    pub fn from_settings(settings: Settings) -> Result<Self, SetupError> {
        let fetcher = HttpFetcher::new(&settings.fetch)?;
        let resolver = SystemResolver::new(ResolverConfig {
            family: settings.geo.ip_family,
            timeout: Duration::from_secs(settings.geo.resolve_timeout_secs),
        });
        let geo = HttpGeoLookup::new(&settings.geo)?;
        let classifier =
            CountryClassifier::new(&settings.countries, Box::new(resolver), Box::new(geo));

        Ok(Generator::new(settings, classifier, Box::new(fetcher)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.settings.common.output_dir)
    }

    /// Runs every subscription in `sources`, in `index` order
    ///
    /// A subscription whose body cannot be fetched is reported and skipped.
    /// Each subscription's countries are written as soon as it is done; the
    /// selector document is updated once at the end with every tag written
    /// during the run.
    pub fn run(&self, sources: &[SubscriptionSource]) -> RunReport {
        let mut report = RunReport::default();
        let common = &self.settings.common;
        let emitter = ConfigEmitter::new(
            self.output_dir(),
            &common.outbound_file_prefix,
            common.emit_mode,
        );

        match emitter.reset() {
            Ok(removed) => report.removed_files = removed,
            Err(e) => {
                error!("Failed to reset output directory: {}", e);
                report.emit_errors.push(e);
            }
        }

        let mut ordered: Vec<&SubscriptionSource> = sources.iter().collect();
        ordered.sort_by_key(|s| s.index);

        let mut members: LinkedHashMap<CountryCode, Vec<String>> = LinkedHashMap::new();

        for source in ordered {
            let (buckets, sub_report) = match self.process_subscription(source) {
                Ok(result) => result,
                Err(e) => {
                    error!("{}", e);
                    report.failures.push(e);
                    continue;
                }
            };

            for (country, result) in emitter.emit(&buckets) {
                match result {
                    Ok(path) => {
                        if !report.files_written.contains(&path) {
                            report.files_written.push(path);
                        }
                        let tags = members.entry(country.clone()).or_insert_with(Vec::new);
                        for tag in buckets.tags(&country) {
                            if !tags.contains(&tag) {
                                tags.push(tag);
                            }
                        }
                    }
                    Err(e) => report.emit_errors.push(e),
                }
            }
            report.subscriptions.push(sub_report);
        }

        let updater = SelectorUpdater::new(
            self.output_dir().join(&common.selector_file),
            &self.settings.selector,
        );
        match updater.update(&members) {
            Ok(updates) => report.selectors = updates,
            Err(e) => {
                error!("Failed to update selectors: {}", e);
                report.emit_errors.push(e);
            }
        }

        report
    }

    /// Fetches one subscription and turns it into country buckets.
    pub fn process_subscription(
        &self,
        source: &SubscriptionSource,
    ) -> Result<(CountryBuckets, SubscriptionReport), SubscriptionError> {
        info!("Processing subscription {}", source.name);
        let body = self
            .fetcher
            .fetch(&source.url)
            .map_err(|source_err| SubscriptionError {
                name: source.name.clone(),
                source: source_err,
            })?;
        Ok(self.process_body(&source.name, &body))
    }

    /// Decodes, classifies and tags every item of a subscription body
    pub fn process_body(&self, name: &str, body: &str) -> (CountryBuckets, SubscriptionReport) {
        let parsed = parse_subscription(body, &self.settings.filters);
        info!(
            "Subscription {}: {:?} body with {} items",
            name,
            parsed.kind,
            parsed.items.len()
        );

        let mut report = SubscriptionReport {
            name: name.to_string(),
            kind: Some(parsed.kind),
            items: parsed.items.len() + parsed.dropped,
            rejected: parsed.dropped,
            ..SubscriptionReport::default()
        };
        let mut buckets = CountryBuckets::new();

        for item in &parsed.items {
            match self.process_item(name, item) {
                ItemOutcome::Node(country, entry) => {
                    buckets.push(country, entry);
                    report.nodes += 1;
                }
                ItemOutcome::Placeholder => report.placeholders += 1,
                ItemOutcome::Rejected => report.rejected += 1,
            }
        }

        info!(
            "Subscription {}: {} nodes, {} info entries, {} rejected",
            name, report.nodes, report.placeholders, report.rejected
        );
        (buckets, report)
    }

    fn process_item(&self, name: &str, item: &SubscriptionItem) -> ItemOutcome {
        match &item.raw {
            RawItem::Uri(uri) => {
                let ctx = DecodeContext::new(name, &self.settings.filters);
                match explode(uri, &ctx) {
                    Ok(node) => {
                        let (country, tier) = self
                            .classifier
                            .classify_with_tier(&node.server, &node.display_text);
                        let tag = node_tag(&country, name, &node.server, item.index);
                        debug!("{} -> {} (by {:?})", node.display_text, tag, tier);
                        ItemOutcome::Node(
                            country,
                            node_to_outbound(&node, &tag, self.settings.common.routing_mark),
                        )
                    }
                    Err(e) if e.is_placeholder() => {
                        debug!("[{}] Skipping info node #{}: {}", name, item.index, e);
                        ItemOutcome::Placeholder
                    }
                    Err(e) => {
                        warn!(
                            "[{}] Dropping item #{} {}: {}",
                            name,
                            item.index,
                            preview(uri),
                            e
                        );
                        ItemOutcome::Rejected
                    }
                }
            }
            RawItem::Native(outbound) => {
                let server = outbound
                    .get("server")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let display = outbound
                    .get("tag")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let (country, tier) = self.classifier.classify_with_tier(server, display);
                let tag = node_tag(&country, name, server, item.index);
                debug!("{} -> {} (by {:?})", display, tag, tier);
                ItemOutcome::Node(country, native_to_outbound(outbound, &tag))
            }
        }
    }
}

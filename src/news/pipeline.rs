use chrono::{DateTime, Utc};
use tracing::info;

use super::fetcher::{FetchOutcome, Fetcher};
use super::filter::RelevanceFilter;
use super::model::Snapshot;
use super::normalize::{normalize, NormalizeOptions};
use super::rank::rank_and_cap;
use super::snapshot::write_snapshot;
use super::source::FeedSource;
use crate::config::IngestSettings;
use crate::error::SnapshotError;

/// Counts for one ingest run, logged at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources: usize,
    pub failed_sources: usize,
    pub fetched_items: usize,
    pub kept_items: usize,
    pub published: usize,
}

/// Turn settled fetch outcomes into a snapshot.
///
/// Pure: the same outcomes, settings and `now` always yield the same
/// snapshot.
pub fn build_snapshot(
    outcomes: Vec<FetchOutcome>,
    settings: &IngestSettings,
    keywords: &[&str],
    now: DateTime<Utc>,
) -> (Snapshot, RunStats) {
    let mut stats = RunStats {
        sources: outcomes.len(),
        failed_sources: outcomes.iter().filter(|o| o.is_failure()).count(),
        ..Default::default()
    };

    let items: Vec<_> = outcomes
        .into_iter()
        .flat_map(FetchOutcome::into_sourced_items)
        .collect();
    stats.fetched_items = items.len();

    let filter = RelevanceFilter::new(keywords, settings.recency_months, now);
    let options = NormalizeOptions {
        description_limit: settings.description_limit,
        always_append_ellipsis: settings.always_append_ellipsis,
    };

    let articles: Vec<_> = items
        .iter()
        .filter(|sourced| filter.accepts(&sourced.item))
        .filter_map(|sourced| normalize(sourced, options))
        .collect();
    stats.kept_items = articles.len();

    let articles = rank_and_cap(articles, settings.max_articles);
    stats.published = articles.len();

    (Snapshot::new(now, articles), stats)
}

/// One ingest run: fetch, filter, normalize, rank, write.
///
/// Only the final write can fail; source failures just mean fewer articles.
pub async fn run_ingest(
    fetcher: &Fetcher,
    sources: &[FeedSource],
    keywords: &[&str],
    settings: &IngestSettings,
    now: DateTime<Utc>,
) -> Result<RunStats, SnapshotError> {
    info!("Fetching {} feeds", sources.len());
    let outcomes = fetcher.fetch_all(sources).await;

    let (snapshot, stats) = build_snapshot(outcomes, settings, keywords, now);
    write_snapshot(&settings.output_path, &snapshot)?;

    info!(
        sources = stats.sources,
        failed = stats.failed_sources,
        fetched = stats.fetched_items,
        kept = stats.kept_items,
        published = stats.published,
        "Ingest complete"
    );
    Ok(stats)
}

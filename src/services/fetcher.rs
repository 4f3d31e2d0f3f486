use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::core::filters::ApiFilters;
use crate::models::InstitutionRecord;
use crate::services::cache::{CacheKey, CacheStats, ResponseCache};
use crate::services::scorecard::{InstitutionPage, InstitutionSource, ScorecardError, ScorecardQuery};

/// Partition-level retrieval failure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("partition {partition} failed: {source}")]
    PartitionFailed {
        partition: String,
        #[source]
        source: ScorecardError,
    },
}

/// Retrieval limits
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Records kept per state partition
    pub per_partition_cap: usize,
    /// Records kept for a fetch without geographic filter
    pub broad_cap: usize,
    pub partition_max_pages: u32,
    pub broad_max_pages: u32,
    /// Pause between consecutive pages of one partition
    pub page_delay: Duration,
    /// State partitions fetched at the same time
    pub max_concurrency: usize,
    /// Send size, locale and cost ranges to the provider. Institutions
    /// missing one of those fields are then dropped by the provider.
    pub server_side_filters: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            per_partition_cap: 200,
            broad_cap: 500,
            partition_max_pages: 50,
            broad_max_pages: 10,
            page_delay: Duration::from_millis(500),
            max_concurrency: 16,
            server_side_filters: false,
        }
    }
}

/// Merged result of one candidate retrieval
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    /// De-duplicated candidates in partition order
    pub candidates: Vec<InstitutionRecord>,
    pub partitions: usize,
    pub failed_partitions: Vec<String>,
}

impl FetchOutcome {
    /// Whether every partition failed, as opposed to returning nothing
    pub fn all_failed(&self) -> bool {
        self.partitions > 0 && self.failed_partitions.len() == self.partitions
    }
}

/// Retrieves candidate institutions, one partition per state
///
/// Partitions run concurrently up to `max_concurrency`; pages inside a
/// partition are fetched one after another through the response cache.
#[derive(Clone)]
pub struct CandidateFetcher {
    source: Arc<dyn InstitutionSource>,
    cache: Option<ResponseCache>,
    settings: FetchSettings,
}

impl CandidateFetcher {
    pub fn new(source: Arc<dyn InstitutionSource>, cache: Option<ResponseCache>, settings: FetchSettings) -> Self {
        Self { source, cache, settings }
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResponseCache::stats)
    }

    fn narrow(&self, query: ScorecardQuery, filters: &ApiFilters) -> ScorecardQuery {
        if !self.settings.server_side_filters {
            return query;
        }
        ScorecardQuery {
            size_range: filters.size_range,
            locale_range: filters.locale_range,
            max_cost: filters.max_cost,
            ..query
        }
    }

    async fn page(&self, query: &ScorecardQuery, page: u32) -> Result<InstitutionPage, ScorecardError> {
        let key = CacheKey::page(query, page);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key).await {
                return Ok(hit);
            }
        }

        let fetched = self.source.fetch_page(query, page).await?;

        if let Some(cache) = &self.cache {
            cache.insert(key, fetched.clone()).await;
        }
        Ok(fetched)
    }

    /// Paginate one partition until the provider runs out, the page ceiling
    /// is hit, or `cap` records are collected.
    async fn fetch_partition(
        &self,
        query: ScorecardQuery,
        cap: usize,
        max_pages: u32,
    ) -> Result<Vec<InstitutionRecord>, FetchError> {
        let partition = query.cache_fragment();
        let mut records: Vec<InstitutionRecord> = Vec::new();
        let mut page = 0;

        while page < max_pages && records.len() < cap {
            if page > 0 && !self.settings.page_delay.is_zero() {
                tokio::time::sleep(self.settings.page_delay).await;
            }

            match self.page(&query, page).await {
                Ok(result) => {
                    let has_more = result.has_more;
                    records.extend(result.results);
                    if !has_more {
                        break;
                    }
                }
                Err(source) if records.is_empty() => {
                    return Err(FetchError::PartitionFailed { partition, source });
                }
                Err(e) => {
                    tracing::warn!(
                        "Page {} of {} failed, keeping {} records: {}",
                        page,
                        partition,
                        records.len(),
                        e
                    );
                    break;
                }
            }
            page += 1;
        }

        records.truncate(cap);
        tracing::debug!("Partition {} yielded {} records", partition, records.len());
        Ok(records)
    }

    /// Fetch candidates for the given provider filters
    ///
    /// Failed partitions are logged and skipped. The merged list keeps state
    /// order and the first occurrence of each institution id.
    pub async fn fetch_candidates(&self, filters: &ApiFilters) -> FetchOutcome {
        let (queries, cap, max_pages) = if filters.states.is_empty() {
            (
                vec![ScorecardQuery::broad()],
                self.settings.broad_cap,
                self.settings.broad_max_pages,
            )
        } else {
            (
                filters.states.iter().map(ScorecardQuery::for_state).collect(),
                self.settings.per_partition_cap,
                self.settings.partition_max_pages,
            )
        };

        let queries: Vec<ScorecardQuery> = queries
            .into_iter()
            .map(|query| self.narrow(query, filters))
            .collect();
        let partitions = queries.len();
        let results: Vec<Result<Vec<InstitutionRecord>, FetchError>> = stream::iter(queries)
            .map(|query| self.fetch_partition(query, cap, max_pages))
            .buffered(self.settings.max_concurrency.max(1))
            .collect()
            .await;

        let mut outcome = FetchOutcome {
            partitions,
            ..Default::default()
        };
        let mut seen: HashSet<i64> = HashSet::new();

        for result in results {
            match result {
                Ok(records) => {
                    for record in records {
                        if seen.insert(record.id) {
                            outcome.candidates.push(record);
                        }
                    }
                }
                Err(FetchError::PartitionFailed { partition, source }) => {
                    tracing::warn!("Skipping partition {}: {}", partition, source);
                    outcome.failed_partitions.push(partition);
                }
            }
        }

        if outcome.all_failed() {
            tracing::error!("All {} partitions failed", partitions);
        } else {
            tracing::info!(
                "Fetched {} unique candidates from {} partitions ({} failed)",
                outcome.candidates.len(),
                partitions,
                outcome.failed_partitions.len()
            );
        }

        outcome
    }

    /// Look up a single institution by id
    pub async fn lookup(&self, id: i64) -> Result<Option<InstitutionRecord>, ScorecardError> {
        let page = self.page(&ScorecardQuery::for_id(id), 0).await?;
        Ok(page.results.into_iter().find(|record| record.id == id))
    }
}

//! Paginated client for SODA-style open-data endpoints.
//!
//! Pages are requested with `$limit`/`$offset`/`$order` and an optional
//! `$where` built from a [`FilterSet`], or with `per_page`/`page` for
//! [`Paging::PerPage`] datasets. Collection is strictly sequential with a
//! fixed pause before each follow-up page of a partition; any failed page
//! aborts the whole collection and nothing is retried.

mod dataset;
mod filter;

pub use dataset::{Dataset, Paging};
pub use filter::{FilterSet, FilterValue};

use std::ops::RangeInclusive;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::fetch::{HttpClient, build_client, fetch_json};
use crate::table::{Record, Table};

/// Courtesy delay between successive pages of one partition.
pub const DEFAULT_PAUSE: Duration = Duration::from_millis(500);

pub struct SodaClient<C> {
    client: C,
    dataset: Dataset,
    pause: Duration,
}

impl SodaClient<Box<dyn HttpClient>> {
    /// Client for `dataset` using the timeout, pause and token from `config`.
    pub fn from_config(config: &Config, dataset: Dataset) -> Result<Self> {
        Ok(Self::new(build_client(config)?, dataset).with_pause(config.pause))
    }
}

impl<C: HttpClient> SodaClient<C> {
    pub fn new(client: C, dataset: Dataset) -> Self {
        Self {
            client,
            dataset,
            pause: DEFAULT_PAUSE,
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Builds the request URL for one page.
    pub fn page_url(
        &self,
        filters: &FilterSet,
        page_size: usize,
        offset: usize,
    ) -> Result<reqwest::Url> {
        if page_size == 0 {
            return Err(FetchError::InvalidPageSize);
        }

        let mut url =
            reqwest::Url::parse(&self.dataset.base_url).map_err(|e| FetchError::Url {
                url: self.dataset.base_url.clone(),
                reason: e.to_string(),
            })?;

        {
            let mut query = url.query_pairs_mut();
            match self.dataset.paging {
                Paging::Soda => {
                    query
                        .append_pair("$limit", &page_size.to_string())
                        .append_pair("$offset", &offset.to_string())
                        .append_pair("$order", &self.dataset.order);
                    if let Some(clause) = filters.where_clause() {
                        query.append_pair("$where", &clause);
                    }
                }
                Paging::PerPage => {
                    query
                        .append_pair("per_page", &page_size.to_string())
                        .append_pair("page", &(offset / page_size + 1).to_string());
                    for (field, value) in filters.clauses() {
                        query.append_pair(field, &value.as_param());
                    }
                }
            }
        }

        Ok(url)
    }

    /// Fetches a single page of at most `page_size` records.
    #[tracing::instrument(skip(self, filters), fields(filters = %filters))]
    pub async fn fetch_page(
        &self,
        filters: &FilterSet,
        page_size: usize,
        offset: usize,
    ) -> Result<Table> {
        let url = self.page_url(filters, page_size, offset)?;
        debug!(%url, "Requesting page");

        let body = fetch_json(&self.client, url).await.inspect_err(|e| {
            warn!(error = %e, "Page request failed");
        })?;
        let table = Table::from_records(page_records(body)?);

        info!(records = table.len(), "Page fetched");
        Ok(table)
    }

    /// Pages through every partition in order until each one returns a short
    /// page. The pause runs only after a full page, before the next page of
    /// the same partition. The first error aborts the collection and is
    /// returned as is.
    #[tracing::instrument(skip(self, partitions), fields(partitions = partitions.len()))]
    pub async fn fetch_all(&self, partitions: &[FilterSet], page_size: usize) -> Result<Table> {
        if page_size == 0 {
            return Err(FetchError::InvalidPageSize);
        }

        let mut table = Table::new();

        for filters in partitions {
            let mut offset = 0;
            let mut collected = 0;

            loop {
                let page = self.fetch_page(filters, page_size, offset).await?;
                let received = page.len();
                collected += received;
                table.append(page);

                if received < page_size {
                    break;
                }
                offset += page_size;
                tokio::time::sleep(self.pause).await;
            }

            info!(filters = %filters, records = collected, "Partition collected");
        }

        if table.is_empty() {
            warn!("No records fetched");
        } else {
            info!(total = table.len(), "Collection finished");
        }
        Ok(table)
    }

    /// One partition per funding year, each narrowed further by `base`.
    pub async fn fetch_years(
        &self,
        years: RangeInclusive<i64>,
        base: &FilterSet,
        page_size: usize,
    ) -> Result<Table> {
        let partitions: Vec<FilterSet> = years
            .map(|year| FilterSet::new().with("funding_year", year).and(base))
            .collect();
        self.fetch_all(&partitions, page_size).await
    }
}

/// Extracts the rows of a page body.
///
/// SODA endpoints answer with a bare array; some education APIs wrap the
/// rows in `{"results": [...]}`.
fn page_records(body: Value) -> Result<Vec<Record>> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("results") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(FetchError::Decode(
                    "expected a JSON array or an object with a `results` array".into(),
                ));
            }
        },
        other => {
            return Err(FetchError::Decode(format!(
                "expected a JSON array, got {other}"
            )));
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| match row {
            Value::Object(record) => Ok(record),
            _ => Err(FetchError::Decode(format!("row {i} is not a JSON object"))),
        })
        .collect()
}

//! Cached job search service that wraps a [`JobFetcher`] with transparent caching.

use color_eyre::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheLayer, CacheResult, CacheSource, MemoryStorage, NoopStorage};
use crate::config::Config;
use crate::error::{FetchError, SearchError};

use super::client::{AdzunaClient, JobFetcher};
use super::request::{Credentials, RequestBuilder};
use super::types::{JobSearchParams, JobSearchResult};

/// Process-wide cache of normalized result pages, keyed by canonical request.
pub type ResponseCache = CacheLayer<JobSearchResult>;

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Job search service with transparent response caching.
///
/// Builds the canonical request, serves fresh cache entries without touching
/// the network, and otherwise fetches, normalizes and stores the page.
#[derive(Clone)]
pub struct CachedJobClient {
  fetcher: Arc<dyn JobFetcher>,
  builder: RequestBuilder,
  cache: ResponseCache,
}

impl CachedJobClient {
  /// Create a client talking to the configured Adzuna endpoint.
  pub fn new(config: &Config) -> Result<Self> {
    Self::with_credentials(config, Config::get_credentials()?)
  }

  fn with_credentials(config: &Config, credentials: Credentials) -> Result<Self> {
    let fetcher = AdzunaClient::new(REQUEST_TIMEOUT)?;
    let builder = RequestBuilder::new(&config.api.base_url, credentials);

    let cache = if config.cache.enabled {
      ResponseCache::new(MemoryStorage::new())
    } else {
      ResponseCache::new(NoopStorage)
    };

    Ok(Self::with_fetcher(Arc::new(fetcher), builder, cache))
  }

  /// Create a client over an arbitrary fetcher and a shared cache.
  pub fn with_fetcher(
    fetcher: Arc<dyn JobFetcher>,
    builder: RequestBuilder,
    cache: ResponseCache,
  ) -> Self {
    Self {
      fetcher,
      builder,
      cache,
    }
  }

  #[cfg(test)]
  pub fn cache(&self) -> &ResponseCache {
    &self.cache
  }

  /// Search for one page of jobs with caching.
  pub async fn search_jobs(
    &self,
    params: &JobSearchParams,
  ) -> std::result::Result<CacheResult<JobSearchResult>, SearchError> {
    let request = self.builder.build(params);
    let key = request.cache_key();
    let digest = request.digest();

    let fetcher = self.fetcher.as_ref();
    let (request_ref, digest_ref) = (&request, &digest);

    let result = self
      .cache
      .fetch(&key, move || async move {
        debug!(key = %digest_ref, page = request_ref.page, "cache miss, fetching");
        let response = tokio::time::timeout(REQUEST_TIMEOUT, fetcher.fetch(request_ref))
          .await
          .map_err(|_| FetchError::timeout())??;
        Ok::<_, FetchError>(response.into_result(request_ref.page, request_ref.results_per_page))
      })
      .await;

    match result {
      Ok(page) => {
        if page.source == CacheSource::Cache {
          debug!(key = %digest, page = request.page, "cache hit");
        }
        Ok(page)
      }
      Err(err) => {
        let err = SearchError::from(err);
        warn!(key = %digest, page = request.page, kind = ?err.kind, status = err.status, "search failed");
        Err(err)
      }
    }
  }
}

//! Paged job search session with incremental loading.
//!
//! A [`SearchOrchestrator`] owns one [`SearchSession`]: the jobs accumulated
//! so far, the last loaded page and whether more pages exist. Page fetches run
//! as spawned tasks; their outcomes come back over a channel and are applied
//! by [`SearchOrchestrator::poll`] on the caller's loop tick.
//!
//! # Example
//!
//! ```ignore
//! let mut search = SearchOrchestrator::new(client, 3);
//! search.search(params);
//!
//! // In event loop tick
//! if search.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // When the user scrolls
//! search.notify_visible(last_visible_row);
//! ```

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::adzuna::cached_client::CachedJobClient;
use crate::adzuna::types::{Job, JobSearchParams, JobSearchResult};
use crate::cache::{CacheResult, CacheSource};
use crate::error::SearchError;

/// Lifecycle of a search session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
  /// No search issued yet
  Idle,
  /// First page in flight
  Searching,
  /// Last requested page applied
  Loaded,
  /// A follow-up page in flight
  LoadingMore,
  /// Last requested page failed; earlier pages are kept
  Failed,
}

/// Data accumulated by the current search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
  /// Jobs from every loaded page, in page order, duplicates kept
  pub jobs: Vec<Job>,
  /// Last loaded page (1 while the first page is in flight)
  pub current_page: u32,
  pub has_more_pages: bool,
  pub total_results: u64,
  pub total_pages: u64,
  /// Most recently applied page as returned by the service
  pub last_page: Option<JobSearchResult>,
  pub last_source: Option<CacheSource>,
  pub last_error: Option<SearchError>,
}

impl SearchSession {
  fn fresh() -> Self {
    Self {
      current_page: 1,
      has_more_pages: true,
      ..Default::default()
    }
  }
}

/// Outcome of one spawned page fetch, tagged with the search it belongs to.
struct PageOutcome {
  generation: u64,
  page: u32,
  result: Result<CacheResult<JobSearchResult>, SearchError>,
}

/// Drives a paged search over a [`CachedJobClient`].
///
/// Calls are expected to be serialized by the owner (typically a UI event
/// loop). Only one page is ever in flight; a new `search` supersedes the
/// previous one and any late outcome of the old search is dropped.
pub struct SearchOrchestrator {
  client: CachedJobClient,
  /// Parameters of the current search, page excluded
  params: Option<JobSearchParams>,
  session: SearchSession,
  state: SearchState,
  /// Bumped by every `search`; outcomes from older generations are discarded
  generation: u64,
  in_flight: Option<u32>,
  failed_page: Option<u32>,
  prefetch_distance: usize,
  outcome_tx: mpsc::UnboundedSender<PageOutcome>,
  outcome_rx: mpsc::UnboundedReceiver<PageOutcome>,
}

impl SearchOrchestrator {
  /// Create an idle orchestrator.
  ///
  /// `prefetch_distance` is how many rows from the end of the list a visible
  /// row must be for [`notify_visible`](Self::notify_visible) to load the next page.
  pub fn new(client: CachedJobClient, prefetch_distance: usize) -> Self {
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

    Self {
      client,
      params: None,
      session: SearchSession::default(),
      state: SearchState::Idle,
      generation: 0,
      in_flight: None,
      failed_page: None,
      prefetch_distance,
      outcome_tx,
      outcome_rx,
    }
  }

  pub fn state(&self) -> SearchState {
    self.state
  }

  pub fn session(&self) -> &SearchSession {
    &self.session
  }

  pub fn jobs(&self) -> &[Job] {
    &self.session.jobs
  }

  #[cfg(test)]
  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Whether a page fetch is outstanding. Stays true until its outcome is
  /// applied by [`poll`](Self::poll).
  pub fn is_loading(&self) -> bool {
    self.in_flight.is_some()
  }

  /// Start a new search, discarding the current session.
  ///
  /// Accepted even while a page is in flight; that page's outcome will be
  /// dropped when it arrives.
  pub fn search(&mut self, params: JobSearchParams) {
    self.generation += 1;
    self.session = SearchSession::fresh();
    self.failed_page = None;
    self.params = Some(params.with_page(1));
    self.state = SearchState::Searching;

    info!(
      generation = self.generation,
      keywords = %params.keywords,
      location = %params.location,
      "new search"
    );

    self.spawn_page(1);
  }

  /// Request the page after the last loaded one.
  ///
  /// Returns `false` without doing anything when no more pages exist, a page
  /// is already in flight, or there is no loaded search to continue.
  pub fn load_more(&mut self) -> bool {
    if !self.session.has_more_pages || self.in_flight.is_some() || self.params.is_none() {
      return false;
    }

    let can_continue = match self.state {
      SearchState::Loaded => true,
      // A failed follow-up page can be requested again
      SearchState::Failed => self.failed_page.is_some_and(|page| page > 1),
      _ => false,
    };
    if !can_continue {
      return false;
    }

    let next = self.session.current_page + 1;
    self.state = SearchState::LoadingMore;
    debug!(generation = self.generation, page = next, "loading more");

    self.spawn_page(next);
    true
  }

  /// Re-issue the page that failed. Returns `false` unless the session is `Failed`.
  pub fn retry(&mut self) -> bool {
    if self.state != SearchState::Failed {
      return false;
    }

    match (self.failed_page, self.params.clone()) {
      (Some(1), Some(params)) => {
        self.search(params);
        true
      }
      (Some(_), Some(_)) => self.load_more(),
      _ => false,
    }
  }

  /// Scroll signal: the row at `last_visible_index` is on screen.
  ///
  /// Loads the next page when that row is within the prefetch distance of the
  /// end of the list. Returns whether a load was started.
  pub fn notify_visible(&mut self, last_visible_index: usize) -> bool {
    let len = self.session.jobs.len();
    if len == 0 {
      return false;
    }

    let reach = last_visible_index
      .saturating_add(self.prefetch_distance)
      .saturating_add(1);
    if reach >= len {
      self.load_more()
    } else {
      false
    }
  }

  /// Apply any outcomes that have arrived without waiting.
  ///
  /// Returns `true` if the session changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(outcome) = self.outcome_rx.try_recv() {
      changed |= self.apply(outcome);
    }
    changed
  }

  /// Wait until the in-flight page (if any) has been applied.
  #[cfg(test)]
  pub async fn settle(&mut self) {
    while self.in_flight.is_some() {
      match self.outcome_rx.recv().await {
        Some(outcome) => {
          self.apply(outcome);
        }
        None => break,
      }
    }
  }

  fn spawn_page(&mut self, page: u32) {
    let Some(base) = self.params.as_ref() else {
      return;
    };

    let params = base.with_page(page);
    let client = self.client.clone();
    let tx = self.outcome_tx.clone();
    let generation = self.generation;
    self.in_flight = Some(page);

    tokio::spawn(async move {
      let result = client.search_jobs(&params).await;
      // Ignore send errors - the orchestrator may have been dropped
      let _ = tx.send(PageOutcome {
        generation,
        page,
        result,
      });
    });
  }

  fn apply(&mut self, outcome: PageOutcome) -> bool {
    if outcome.generation != self.generation || self.in_flight != Some(outcome.page) {
      debug!(
        generation = outcome.generation,
        current = self.generation,
        page = outcome.page,
        "dropping superseded page"
      );
      return false;
    }

    self.in_flight = None;

    match outcome.result {
      Ok(CacheResult { data, source }) => {
        self.session.jobs.extend(data.jobs.iter().cloned());
        self.session.current_page = outcome.page;
        self.session.total_results = data.total_results;
        self.session.total_pages = data.total_pages;
        self.session.has_more_pages = (self.session.jobs.len() as u64) < data.total_results;
        self.session.last_page = Some(data);
        self.session.last_source = Some(source);
        self.session.last_error = None;
        self.failed_page = None;
        self.state = SearchState::Loaded;

        debug!(
          generation = self.generation,
          page = outcome.page,
          accumulated = self.session.jobs.len(),
          total = self.session.total_results,
          ?source,
          "page loaded"
        );
      }
      Err(err) => {
        warn!(
          generation = self.generation,
          page = outcome.page,
          kind = ?err.kind,
          "page failed"
        );
        self.session.last_error = Some(err);
        self.failed_page = Some(outcome.page);
        self.state = SearchState::Failed;
      }
    }

    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adzuna::api_types::RawApiResponse;
  use crate::adzuna::cached_client::tests::{client_with, page_of, test_builder, StubFetcher};
  use crate::adzuna::cached_client::ResponseCache;
  use crate::adzuna::client::JobFetcher;
  use crate::adzuna::request::CanonicalRequest;
  use crate::cache::MemoryStorage;
  use crate::error::{ErrorKind, FetchError};
  use futures::future::{BoxFuture, FutureExt};
  use std::sync::Arc;
  use std::time::Duration;
  use tokio::sync::Notify;

  fn engineer(per_page: u32) -> JobSearchParams {
    JobSearchParams {
      keywords: "engineer".to_string(),
      location: String::new(),
      country: "gb".to_string(),
      page: 1,
      results_per_page: Some(per_page),
      ..Default::default()
    }
  }

  fn ids(search: &SearchOrchestrator) -> Vec<&str> {
    search.jobs().iter().map(|j| j.id.as_str()).collect()
  }

  #[tokio::test]
  async fn test_search_then_load_more() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A"), ("b", "Job B")], 5)));
    fetcher.respond(Ok(page_of(&[("c", "Job C"), ("d", "Job D")], 5)));
    let mut search = SearchOrchestrator::new(client_with(fetcher.clone()), 0);

    assert_eq!(search.state(), SearchState::Idle);
    search.search(engineer(2));
    assert_eq!(search.state(), SearchState::Searching);
    search.settle().await;

    assert_eq!(search.state(), SearchState::Loaded);
    let first = search.session().last_page.clone().unwrap();
    assert_eq!(first.total_results, 5);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.items_per_page, 2);
    assert_eq!(ids(&search), vec!["a", "b"]);

    assert!(search.load_more());
    assert_eq!(search.state(), SearchState::LoadingMore);
    search.settle().await;

    assert_eq!(ids(&search), vec!["a", "b", "c", "d"]);
    assert_eq!(search.session().current_page, 2);
    assert!(search.session().has_more_pages);

    let requests = fetcher.requests();
    assert_eq!(requests[1].page, 2);
    assert_eq!(requests[1].results_per_page, 2);
  }

  #[tokio::test]
  async fn test_load_more_without_more_pages_is_noop() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A"), ("b", "Job B")], 2)));
    let mut search = SearchOrchestrator::new(client_with(fetcher.clone()), 0);

    search.search(engineer(2));
    search.settle().await;
    assert!(!search.session().has_more_pages);

    let before = search.session().clone();
    let generation = search.generation();
    assert!(!search.load_more());

    assert_eq!(search.session(), &before);
    assert_eq!(search.generation(), generation);
    assert_eq!(search.state(), SearchState::Loaded);
    assert_eq!(fetcher.calls(), 1);
  }

  #[tokio::test]
  async fn test_load_more_while_in_flight_is_noop() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A")], 10)));
    let mut search = SearchOrchestrator::new(client_with(fetcher.clone()), 0);

    search.search(engineer(1));
    assert!(!search.load_more());
    search.settle().await;
    assert_eq!(fetcher.calls(), 1);
  }

  #[tokio::test]
  async fn test_duplicates_are_kept() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A"), ("b", "Job B")], 6)));
    fetcher.respond(Ok(page_of(&[("b", "Job B"), ("c", "Job C")], 6)));
    let mut search = SearchOrchestrator::new(client_with(fetcher), 0);

    search.search(engineer(2));
    search.settle().await;
    search.load_more();
    search.settle().await;

    assert_eq!(ids(&search), vec!["a", "b", "b", "c"]);
  }

  #[tokio::test]
  async fn test_rate_limit_keeps_accumulated_jobs() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A"), ("b", "Job B")], 5)));
    fetcher.respond(Err(FetchError::http(429)));
    let mut search = SearchOrchestrator::new(client_with(fetcher), 0);

    search.search(engineer(2));
    search.settle().await;
    search.load_more();
    search.settle().await;

    assert_eq!(search.state(), SearchState::Failed);
    let err = search.session().last_error.clone().unwrap();
    assert_eq!(err.kind, ErrorKind::RateLimited);
    assert_eq!(ids(&search), vec!["a", "b"]);
    assert_eq!(search.session().current_page, 1);
  }

  #[tokio::test]
  async fn test_failed_load_more_can_be_retried() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A")], 3)));
    fetcher.respond(Err(FetchError::http(503)));
    fetcher.respond(Ok(page_of(&[("b", "Job B")], 3)));
    let mut search = SearchOrchestrator::new(client_with(fetcher.clone()), 0);

    search.search(engineer(1));
    search.settle().await;
    search.load_more();
    search.settle().await;
    assert_eq!(search.state(), SearchState::Failed);

    assert!(search.retry());
    search.settle().await;

    assert_eq!(search.state(), SearchState::Loaded);
    assert_eq!(ids(&search), vec!["a", "b"]);
    assert_eq!(search.session().current_page, 2);
    assert!(search.session().last_error.is_none());
    // The retried request asked for page 2 again, not page 3
    assert_eq!(fetcher.requests()[2].page, 2);
  }

  #[tokio::test]
  async fn test_failed_first_page_retries_as_search() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Err(FetchError::unreachable("offline")));
    fetcher.respond(Ok(page_of(&[("a", "Job A")], 1)));
    let mut search = SearchOrchestrator::new(client_with(fetcher), 0);

    search.search(engineer(1));
    search.settle().await;
    assert_eq!(search.state(), SearchState::Failed);
    assert_eq!(
      search.session().last_error.as_ref().map(|e| e.kind),
      Some(ErrorKind::NetworkUnreachable)
    );
    // Nothing loaded yet, so there is nothing to continue from
    assert!(!search.load_more());

    assert!(search.retry());
    search.settle().await;
    assert_eq!(ids(&search), vec!["a"]);
    assert_eq!(search.generation(), 2);
  }

  #[tokio::test]
  async fn test_new_search_resets_session() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A"), ("b", "Job B")], 4)));
    fetcher.respond(Ok(page_of(&[("c", "Job C"), ("d", "Job D")], 4)));
    fetcher.respond(Ok(page_of(&[("x", "Designer")], 1)));
    let mut search = SearchOrchestrator::new(client_with(fetcher), 0);

    search.search(engineer(2));
    search.settle().await;
    search.load_more();
    search.settle().await;
    assert_eq!(search.session().current_page, 2);

    let mut params = engineer(2);
    params.keywords = "designer".to_string();
    search.search(params);
    assert!(search.jobs().is_empty());
    assert_eq!(search.session().current_page, 1);
    assert!(search.session().has_more_pages);

    search.settle().await;
    assert_eq!(ids(&search), vec!["x"]);
    assert!(!search.session().has_more_pages);
  }

  #[tokio::test]
  async fn test_notify_visible_loads_near_end() {
    let fetcher = Arc::new(StubFetcher::new());
    let first: Vec<(String, String)> = (0..10)
      .map(|i| (i.to_string(), format!("Job {}", i)))
      .collect();
    let first: Vec<(&str, &str)> = first.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    fetcher.respond(Ok(page_of(&first, 20)));
    fetcher.respond(Ok(page_of(&[("10", "Job 10")], 20)));
    let mut search = SearchOrchestrator::new(client_with(fetcher.clone()), 3);

    // No jobs yet
    assert!(!search.notify_visible(0));

    search.search(engineer(10));
    search.settle().await;

    assert!(!search.notify_visible(2));
    assert!(!search.notify_visible(5));
    assert_eq!(fetcher.calls(), 1);

    assert!(search.notify_visible(6));
    // Already loading
    assert!(!search.notify_visible(9));
    search.settle().await;

    assert_eq!(fetcher.calls(), 2);
    assert_eq!(search.jobs().len(), 11);
  }

  /// First request blocks until released; later ones answer immediately.
  struct GatedFetcher {
    gate: Notify,
    calls: std::sync::atomic::AtomicUsize,
  }

  impl JobFetcher for GatedFetcher {
    fn fetch<'a>(
      &'a self,
      _request: &'a CanonicalRequest,
    ) -> BoxFuture<'a, Result<RawApiResponse, FetchError>> {
      let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
      async move {
        if call == 0 {
          self.gate.notified().await;
          Ok(page_of(&[("old", "Stale result")], 1))
        } else {
          Ok(page_of(&[("new", "Fresh result")], 1))
        }
      }
      .boxed()
    }
  }

  #[tokio::test]
  async fn test_superseded_response_is_dropped() {
    let fetcher = Arc::new(GatedFetcher {
      gate: Notify::new(),
      calls: Default::default(),
    });
    let client = crate::adzuna::cached_client::CachedJobClient::with_fetcher(
      fetcher.clone(),
      test_builder(),
      ResponseCache::new(MemoryStorage::new()),
    );
    let mut search = SearchOrchestrator::new(client, 0);

    search.search(engineer(1));
    let mut params = engineer(1);
    params.keywords = "designer".to_string();
    search.search(params);
    search.settle().await;
    assert_eq!(ids(&search), vec!["new"]);

    // Let the first request finish late
    fetcher.gate.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!search.poll());
    assert_eq!(ids(&search), vec!["new"]);
    assert_eq!(search.state(), SearchState::Loaded);
  }

  #[tokio::test]
  async fn test_poll_applies_arrived_page() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A")], 1)));
    let mut search = SearchOrchestrator::new(client_with(fetcher), 0);

    assert!(!search.poll());
    search.search(engineer(1));
    assert!(search.is_loading());

    while !search.poll() {
      tokio::task::yield_now().await;
    }
    assert!(!search.is_loading());
    assert_eq!(search.state(), SearchState::Loaded);
    assert_eq!(ids(&search), vec!["a"]);
    assert!(!search.poll());
  }

  #[tokio::test]
  async fn test_notify_visible_tolerates_huge_index() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A")], 2)));
    fetcher.respond(Ok(page_of(&[("b", "Job B")], 2)));
    let mut search = SearchOrchestrator::new(client_with(fetcher), usize::MAX);

    search.search(engineer(1));
    search.settle().await;

    assert!(search.notify_visible(usize::MAX));
    search.settle().await;
    assert_eq!(ids(&search), vec!["a", "b"]);
  }

  #[tokio::test]
  async fn test_second_search_with_same_params_hits_cache() {
    let fetcher = Arc::new(StubFetcher::new());
    fetcher.respond(Ok(page_of(&[("a", "Job A")], 1)));
    let mut search = SearchOrchestrator::new(client_with(fetcher.clone()), 0);

    search.search(engineer(1));
    search.settle().await;
    search.search(engineer(1));
    search.settle().await;

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(search.session().last_source, Some(CacheSource::Cache));
    assert_eq!(ids(&search), vec!["a"]);
  }
}

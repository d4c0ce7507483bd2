//! Mapping from search parameters to the canonical outbound request.

use sha2::{Digest, Sha256};
use url::form_urlencoded;

use super::types::JobSearchParams;

pub const DEFAULT_COUNTRY: &str = "gb";
pub const DEFAULT_RESULTS_PER_PAGE: u32 = 20;
pub const DEFAULT_SORT: &str = "date";

/// Adzuna application credentials, sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub app_id: String,
  pub app_key: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("app_id", &self.app_id)
      .field("app_key", &"<redacted>")
      .finish()
  }
}

/// Deterministic outbound request for one page of results.
///
/// Doubles as the basis of the response cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
  pub url: String,
  /// Query parameters in the order they were set
  pub params: Vec<(String, String)>,
  /// Effective page number
  pub page: u32,
  /// Effective page size
  pub results_per_page: u32,
}

impl CanonicalRequest {
  /// Serialized parameter string, in insertion order.
  pub fn query_string(&self) -> String {
    form_urlencoded::Serializer::new(String::new())
      .extend_pairs(self.params.iter())
      .finish()
  }

  /// Response cache key: the full URL followed by its parameter string.
  ///
  /// The key embeds the credentials, which are constant per deployment.
  pub fn cache_key(&self) -> String {
    format!("{}?{}", self.url, self.query_string())
  }

  /// Short digest of the cache key, safe to log.
  pub fn digest(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.cache_key().as_bytes());
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(12);
    hash
  }

  /// Look up a parameter value by name.
  #[cfg(test)]
  pub fn param(&self, name: &str) -> Option<&str> {
    self
      .params
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value.as_str())
  }
}

/// Builds [`CanonicalRequest`]s against a fixed API base and credentials.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
  base_url: String,
  credentials: Credentials,
}

impl RequestBuilder {
  pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Self {
      base_url,
      credentials,
    }
  }

  /// Resolve defaults and map `params` onto the upstream query format.
  ///
  /// Blank or unrecognized optional inputs are left out entirely, so a caller
  /// passing a default explicitly gets the same request as one omitting it.
  pub fn build(&self, params: &JobSearchParams) -> CanonicalRequest {
    let country = non_blank(&params.country)
      .map(str::to_lowercase)
      .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
    let page = if params.page == 0 { 1 } else { params.page };
    let results_per_page = params
      .results_per_page
      .filter(|n| *n > 0)
      .unwrap_or(DEFAULT_RESULTS_PER_PAGE);

    let url = format!("{}/{}/search/{}", self.base_url, country, page);

    let mut query = QueryParams::default();
    query.set("app_id", &self.credentials.app_id);
    query.set("app_key", &self.credentials.app_key);
    query.set("results_per_page", &results_per_page.to_string());
    query.set("content-type", "application/json");

    if let Some(keywords) = non_blank(&params.keywords) {
      query.set("title_only", keywords);
    }

    if let Some(location) = non_blank(&params.location) {
      query.set("where", location);
    }

    if let Some(category) = params.category.as_deref().and_then(non_blank) {
      query.set("category", category);
    }

    let sort = params
      .sort_by
      .as_deref()
      .and_then(non_blank)
      .filter(|s| *s != "default")
      .unwrap_or(DEFAULT_SORT);
    query.set("sort_by", sort);

    match params.contract_type.as_deref().map(str::trim) {
      Some("permanent") => query.set("permanent", "1"),
      Some("contract") => query.set("contract", "1"),
      _ => {}
    }

    match params.contract_time.as_deref().map(str::trim) {
      Some("full_time") => query.set("full_time", "1"),
      Some("part_time") => query.set("part_time", "1"),
      _ => {}
    }

    if let Some(salary_min) = params.salary_min.filter(|n| *n > 0) {
      query.set("salary_min", &salary_min.to_string());
    }

    CanonicalRequest {
      url,
      params: query.into_pairs(),
      page,
      results_per_page,
    }
  }
}

/// Ordered parameter set where setting an existing key replaces its value in place.
#[derive(Default)]
struct QueryParams {
  pairs: Vec<(String, String)>,
}

impl QueryParams {
  fn set(&mut self, key: &str, value: &str) {
    match self.pairs.iter_mut().find(|(k, _)| k == key) {
      Some((_, existing)) => *existing = value.to_string(),
      None => self.pairs.push((key.to_string(), value.to_string())),
    }
  }

  fn into_pairs(self) -> Vec<(String, String)> {
    self.pairs
  }
}

fn non_blank(s: &str) -> Option<&str> {
  let trimmed = s.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed)
  }
}

use crate::adzuna::api_types::RawApiResponse;
use crate::adzuna::request::CanonicalRequest;
use crate::error::FetchError;
use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::ACCEPT;
use std::time::{Duration, Instant};
use tracing::debug;

/// Network boundary for one page of search results.
///
/// Implementations perform a single request and report transport failures as
/// [`FetchError`]; they do not retry.
pub trait JobFetcher: Send + Sync {
  fn fetch<'a>(
    &'a self,
    request: &'a CanonicalRequest,
  ) -> BoxFuture<'a, std::result::Result<RawApiResponse, FetchError>>;
}

/// Adzuna API client over reqwest
#[derive(Clone)]
pub struct AdzunaClient {
  http: reqwest::Client,
}

impl AdzunaClient {
  pub fn new(timeout: Duration) -> Result<Self> {
    let http = reqwest::Client::builder()
      .gzip(true)
      .timeout(timeout)
      .user_agent(concat!("jobseek/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http })
  }
}

impl JobFetcher for AdzunaClient {
  fn fetch<'a>(
    &'a self,
    request: &'a CanonicalRequest,
  ) -> BoxFuture<'a, std::result::Result<RawApiResponse, FetchError>> {
    async move {
      let started = Instant::now();

      let response = self
        .http
        .get(&request.url)
        .query(&request.params)
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(transport_error)?;

      let status = response.status();
      debug!(
        url = %request.url,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "search request finished"
      );

      if !status.is_success() {
        return Err(FetchError::http(status.as_u16()));
      }

      response
        .json::<RawApiResponse>()
        .await
        .map_err(|e| {
          FetchError::decode(
            status.as_u16(),
            format!("invalid response body: {}", e.without_url()),
          )
        })
    }
    .boxed()
  }
}

/// Request URLs carry credentials, so they are stripped from error text.
fn transport_error(err: reqwest::Error) -> FetchError {
  if err.is_timeout() {
    FetchError::timeout()
  } else if let Some(status) = err.status() {
    FetchError::http(status.as_u16())
  } else {
    FetchError::unreachable(err.without_url().to_string())
  }
}

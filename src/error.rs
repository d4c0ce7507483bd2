//! Error taxonomy for job searches.
//!
//! Only the fetch step of a search can fail. Transport failures arrive as a
//! [`FetchError`] and are classified into a [`SearchError`] before they leave
//! the search service.

use thiserror::Error;

/// Category of a failed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Request exceeded the fixed timeout
  Timeout,
  /// 401 - invalid credentials
  Unauthorized,
  /// 403 - access denied
  Forbidden,
  /// 404 - no results for this country/search
  NotFound,
  /// 429 - upstream rate limit
  RateLimited,
  /// 5xx - upstream service unavailable
  ServerUnavailable,
  /// Status 0 - the request never reached the upstream service
  NetworkUnreachable,
  Unknown,
}

impl ErrorKind {
  /// User-facing message for this kind of failure.
  pub fn message(self) -> &'static str {
    match self {
      ErrorKind::Timeout => "The request is taking too long. Please try again.",
      ErrorKind::Unauthorized => {
        "Invalid API credentials. Please check your Adzuna app_id and app_key."
      }
      ErrorKind::Forbidden => "Access denied. Please verify your Adzuna API key.",
      ErrorKind::NotFound => "No results found for this country/search.",
      ErrorKind::RateLimited => "Rate limit exceeded (250/day). Please try again later.",
      ErrorKind::ServerUnavailable => {
        "Adzuna service is temporarily unavailable. Please try again later."
      }
      ErrorKind::NetworkUnreachable => "Network error. Please check your internet connection.",
      ErrorKind::Unknown => "An unexpected error occurred. Please try again.",
    }
  }

  /// Failures worth re-issuing the same request for.
  pub fn is_transient(self) -> bool {
    matches!(
      self,
      ErrorKind::Timeout | ErrorKind::ServerUnavailable | ErrorKind::NetworkUnreachable
    )
  }
}

/// Failure reported by the transport layer.
///
/// `status` is the HTTP status code, or 0 when no response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail} (status {status})")]
pub struct FetchError {
  pub status: u16,
  pub timed_out: bool,
  pub detail: String,
}

impl FetchError {
  /// The upstream service answered with a non-success status.
  pub fn http(status: u16) -> Self {
    Self {
      status,
      timed_out: false,
      detail: format!("HTTP {}", status),
    }
  }

  /// No response was received at all.
  pub fn unreachable(detail: impl Into<String>) -> Self {
    Self {
      status: 0,
      timed_out: false,
      detail: detail.into(),
    }
  }

  pub fn timeout() -> Self {
    Self {
      status: 0,
      timed_out: true,
      detail: "request timed out".to_string(),
    }
  }

  /// A response arrived but its body could not be decoded.
  pub fn decode(status: u16, detail: impl Into<String>) -> Self {
    Self {
      status,
      timed_out: false,
      detail: detail.into(),
    }
  }

  /// Map this failure onto the search error taxonomy.
  pub fn classify(&self) -> ErrorKind {
    if self.timed_out {
      return ErrorKind::Timeout;
    }

    match self.status {
      401 => ErrorKind::Unauthorized,
      403 => ErrorKind::Forbidden,
      429 => ErrorKind::RateLimited,
      0 => ErrorKind::NetworkUnreachable,
      404 => ErrorKind::NotFound,
      s if s >= 500 => ErrorKind::ServerUnavailable,
      _ => ErrorKind::Unknown,
    }
  }
}

/// Classified search failure surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SearchError {
  pub kind: ErrorKind,
  pub message: String,
  /// HTTP status of the failed request (0 if none was received)
  pub status: u16,
}

impl SearchError {
  pub fn new(kind: ErrorKind, status: u16) -> Self {
    Self {
      kind,
      message: kind.message().to_string(),
      status,
    }
  }
}

impl From<FetchError> for SearchError {
  fn from(err: FetchError) -> Self {
    SearchError::new(err.classify(), err.status)
  }
}

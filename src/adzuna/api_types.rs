//! Serde-deserializable types matching Adzuna search responses.
//!
//! These types are separate from domain types so that the heterogeneous
//! upstream payload can be decoded leniently and then normalized once.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::normalize::normalize;
use super::types::JobSearchResult;

// ============================================================================
// Search endpoint response
// ============================================================================

/// Body of `GET /jobs/{country}/search/{page}`.
///
/// A missing `results` is read as an empty list and a missing `count` as zero.
/// Entries of `results` that are not objects are skipped.
#[derive(Debug, Default, Deserialize)]
pub struct RawApiResponse {
  #[serde(default, deserialize_with = "lenient_records")]
  pub results: Option<Vec<RawJobRecord>>,
  #[serde(default, deserialize_with = "lenient_count")]
  pub count: Option<u64>,
}

/// One upstream listing. Every field tolerates a missing value, `null`, or a
/// value of the wrong type; anything unusable decodes as `None`.
#[derive(Debug, Default, Deserialize)]
pub struct RawJobRecord {
  #[serde(default, deserialize_with = "lenient_string")]
  pub id: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub title: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub description: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub created: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub redirect_url: Option<String>,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub salary_min: Option<f64>,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub salary_max: Option<f64>,
  /// 1 when the salary is an upstream estimate
  #[serde(default, deserialize_with = "lenient_int")]
  pub salary_is_predicted: Option<i64>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub contract_type: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub contract_time: Option<String>,
  #[serde(default, deserialize_with = "lenient_object")]
  pub location: Option<RawLocation>,
  #[serde(default, deserialize_with = "lenient_object")]
  pub category: Option<RawCategory>,
  #[serde(default, deserialize_with = "lenient_object")]
  pub company: Option<RawCompany>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawLocation {
  #[serde(default, deserialize_with = "lenient_string")]
  pub display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCategory {
  #[serde(default, deserialize_with = "lenient_string")]
  pub label: Option<String>,
  #[serde(default, deserialize_with = "lenient_string")]
  pub tag: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCompany {
  #[serde(default, deserialize_with = "lenient_string")]
  pub display_name: Option<String>,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl RawApiResponse {
  /// Normalize one page of results and attach pagination metadata.
  ///
  /// `results_per_page` must be the effective (non-zero) page size the
  /// request was made with.
  pub fn into_result(self, page: u32, results_per_page: u32) -> JobSearchResult {
    let jobs = self
      .results
      .unwrap_or_default()
      .into_iter()
      .map(normalize)
      .collect();
    let total_results = self.count.unwrap_or(0);
    let per_page = u64::from(results_per_page.max(1));

    JobSearchResult {
      jobs,
      total_results,
      current_page: page,
      total_pages: total_results.div_ceil(per_page),
      items_per_page: results_per_page,
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) => Some(s),
    Some(Value::Number(n)) => Some(n.to_string()),
    Some(Value::Bool(b)) => Some(b.to_string()),
    _ => None,
  })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n.as_f64(),
    Some(Value::String(s)) => s.trim().parse().ok(),
    _ => None,
  }
  .filter(|n: &f64| n.is_finite()))
}

fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n.as_i64(),
    Some(Value::String(s)) => s.trim().parse().ok(),
    Some(Value::Bool(b)) => Some(i64::from(b)),
    _ => None,
  })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Number(n)) => n.as_u64(),
    Some(Value::String(s)) => s.trim().parse().ok(),
    _ => None,
  })
}

/// Nested object that decodes as `None` when it has the wrong shape
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: DeserializeOwned,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(value
    .filter(Value::is_object)
    .and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_records<'de, D>(deserializer: D) -> Result<Option<Vec<RawJobRecord>>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::Array(items)) => Some(
      items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect(),
    ),
    _ => None,
  })
}

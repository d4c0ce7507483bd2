//! Conversion of raw upstream listings into [`Job`] values.
//!
//! Every function here is total: missing or malformed fields fall back to
//! defaults instead of failing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::api_types::RawJobRecord;
use super::types::{Company, Job, JobLevel};

/// Maximum length of `Job::short_description` before the ellipsis.
pub const SHORT_DESCRIPTION_LEN: usize = 160;

const UNKNOWN_COMPANY: &str = "Unknown Company";
const UNKNOWN_LOCATION: &str = "Not specified";

static STRONG_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?strong>").expect("valid regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static TRAILING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\S*$").expect("valid regex"));

/// Build a [`Job`] from a raw upstream record.
pub fn normalize(raw: RawJobRecord) -> Job {
  let raw_title = raw.title.unwrap_or_default();
  let description = raw.description.unwrap_or_default();
  let salary_min = raw.salary_min.filter(|n| *n != 0.0);
  let salary_max = raw.salary_max.filter(|n| *n != 0.0);

  let (categories, tags) = match raw.category {
    Some(category) => (
      category.label.into_iter().collect(),
      category.tag.into_iter().collect(),
    ),
    None => (Vec::new(), Vec::new()),
  };

  Job {
    id: raw.id.unwrap_or_default(),
    title: clean_title(&raw_title),
    company: Company {
      name: raw
        .company
        .and_then(|c| c.display_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
    },
    location: raw
      .location
      .and_then(|l| l.display_name)
      .filter(|name| !name.is_empty())
      .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
    publication_date: raw.created.unwrap_or_default(),
    short_description: truncate_text(&description, SHORT_DESCRIPTION_LEN),
    description,
    job_type: format_contract_type(raw.contract_type.as_deref()),
    level: infer_level(&raw_title),
    categories,
    landing_page_url: raw.redirect_url.unwrap_or_default(),
    tags,
    salary: format_salary(salary_min, salary_max, raw.salary_is_predicted),
    salary_min,
    salary_max,
    contract_time: format_contract_time(raw.contract_time.as_deref()),
  }
}

/// Strip markup from a title and decode the common HTML entities.
pub fn clean_title(title: &str) -> String {
  let without_strong = STRONG_TAG.replace_all(title, "");
  let without_tags = ANY_TAG.replace_all(&without_strong, "");

  without_tags
    .replace("&amp;", "&")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .trim()
    .to_string()
}

/// Plain-text excerpt of `text`, at most `max_len` characters plus "...".
///
/// Tags become spaces and whitespace runs collapse. When the text is too long
/// it is cut at `max_len` and backed up to the last word boundary.
pub fn truncate_text(text: &str, max_len: usize) -> String {
  if text.is_empty() {
    return String::new();
  }

  let spaced = ANY_TAG.replace_all(text, " ");
  let decoded = spaced.replace("&nbsp;", " ").replace("&amp;", "&");
  let clean = WHITESPACE_RUN.replace_all(&decoded, " ").trim().to_string();

  if clean.chars().count() <= max_len {
    return clean;
  }

  let cut: String = clean.chars().take(max_len).collect();
  format!("{}...", TRAILING_WORD.replace(&cut, ""))
}

/// Display string for a salary range in pounds.
///
/// Zero bounds count as absent. The "(est.)" suffix is added only when the
/// upstream flags the salary as predicted and a salary string was produced.
pub fn format_salary(min: Option<f64>, max: Option<f64>, is_predicted: Option<i64>) -> String {
  let min = min.filter(|n| *n != 0.0);
  let max = max.filter(|n| *n != 0.0);

  let mut salary = match (min, max) {
    (Some(lo), Some(hi)) if lo != hi => {
      format!("£{} - £{}", format_amount(lo), format_amount(hi))
    }
    (Some(lo), _) => format!("£{}+", format_amount(lo)),
    (None, Some(hi)) => format!("Up to £{}", format_amount(hi)),
    (None, None) => String::new(),
  };

  if is_predicted == Some(1) && !salary.is_empty() {
    salary.push_str(" (est.)");
  }

  salary
}

/// Amounts of 1000 and above round to the nearest thousand with a "k" suffix.
fn format_amount(n: f64) -> String {
  if n >= 1000.0 {
    format!("{}k", (n / 1000.0).round() as i64)
  } else if n.fract() == 0.0 {
    format!("{}", n as i64)
  } else {
    n.to_string()
  }
}

pub fn format_contract_type(code: Option<&str>) -> String {
  match code {
    None | Some("") => String::new(),
    Some("permanent") => "Permanent".to_string(),
    Some("contract") => "Contract".to_string(),
    Some(other) => other.to_string(),
  }
}

pub fn format_contract_time(code: Option<&str>) -> String {
  match code {
    None | Some("") => String::new(),
    Some("full_time") => "Full Time".to_string(),
    Some("part_time") => "Part Time".to_string(),
    Some(other) => other.to_string(),
  }
}

/// Infer seniority from title keywords. Rules are checked in order and the
/// first match wins.
pub fn infer_level(title: &str) -> JobLevel {
  let t = title.to_lowercase();
  let has_any = |needles: &[&str]| needles.iter().any(|n| t.contains(n));

  if t.contains("intern") {
    JobLevel::Internship
  } else if has_any(&["junior", "entry", "jr.", "jr ", "graduate"]) {
    JobLevel::EntryLevel
  } else if has_any(&["senior", "sr.", "sr ", "lead"]) {
    JobLevel::SeniorLevel
  } else if has_any(&["staff", "principal"]) {
    JobLevel::Staff
  } else if has_any(&["manager", "director", "head of", "vp"]) {
    JobLevel::Management
  } else {
    JobLevel::MidLevel
  }
}

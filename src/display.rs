use chrono::{DateTime, Utc};

use crate::adzuna::types::Job;

const TITLE_WIDTH: usize = 60;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

fn plural(n: i64, unit: &str) -> String {
  format!("{} {}{} ago", n, unit, if n > 1 { "s" } else { "" })
}

/// Relative label for a publication timestamp.
///
/// Returns an empty string for a missing or unparseable timestamp. Anything
/// a year or older is shown as a date.
pub fn time_ago(published: &str, now: DateTime<Utc>) -> String {
  let Ok(date) = DateTime::parse_from_rfc3339(published.trim()) else {
    return String::new();
  };
  let date = date.with_timezone(&Utc);

  let seconds = (now - date).num_seconds();
  let minutes = seconds / 60;
  let hours = minutes / 60;
  let days = hours / 24;
  let weeks = days / 7;
  let months = days / 30;

  match () {
    _ if seconds < 60 => "just now".to_string(),
    _ if minutes < 60 => plural(minutes, "minute"),
    _ if hours < 24 => plural(hours, "hour"),
    _ if days == 1 => "yesterday".to_string(),
    _ if days < 7 => format!("{} days ago", days),
    _ if weeks == 1 => "1 week ago".to_string(),
    _ if weeks < 4 => format!("{} weeks ago", weeks),
    _ if months == 1 => "1 month ago".to_string(),
    _ if months < 12 => format!("{} months ago", months),
    _ => date.format("%b %-d, %Y").to_string(),
  }
}

/// One listing row: title, company, location, salary, level, age
pub fn job_line(job: &Job, now: DateTime<Utc>) -> String {
  let mut parts = vec![
    truncate(&job.title, TITLE_WIDTH),
    job.company.name.clone(),
    job.location.clone(),
  ];
  if !job.salary.is_empty() {
    parts.push(job.salary.clone());
  }
  parts.push(job.level.to_string());

  let age = time_ago(&job.publication_date, now);
  if !age.is_empty() {
    parts.push(age);
  }

  parts.join(" | ")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adzuna::api_types::RawJobRecord;
  use crate::adzuna::normalize::normalize;
  use chrono::{Duration, TimeZone};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
  }

  fn ago(delta: Duration) -> String {
    time_ago(&(now() - delta).to_rfc3339(), now())
  }

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Développeur logiciel", 8), "Dével...");
  }

  #[test]
  fn test_time_ago_labels() {
    assert_eq!(ago(Duration::seconds(30)), "just now");
    assert_eq!(ago(Duration::minutes(1)), "1 minute ago");
    assert_eq!(ago(Duration::minutes(59)), "59 minutes ago");
    assert_eq!(ago(Duration::hours(2)), "2 hours ago");
    assert_eq!(ago(Duration::hours(30)), "yesterday");
    assert_eq!(ago(Duration::days(3)), "3 days ago");
    assert_eq!(ago(Duration::days(8)), "1 week ago");
    assert_eq!(ago(Duration::days(20)), "2 weeks ago");
    assert_eq!(ago(Duration::days(31)), "1 month ago");
    assert_eq!(ago(Duration::days(200)), "6 months ago");
  }

  #[test]
  fn test_time_ago_old_dates_and_garbage() {
    assert_eq!(time_ago("2022-03-05T09:00:00Z", now()), "Mar 5, 2022");
    assert_eq!(time_ago("", now()), "");
    assert_eq!(time_ago("last tuesday", now()), "");
  }

  #[test]
  fn test_job_line() {
    let job = normalize(RawJobRecord {
      id: Some("1".to_string()),
      title: Some("Senior Rust Engineer".to_string()),
      created: Some("2024-06-14T12:00:00Z".to_string()),
      salary_min: Some(50000.0),
      salary_max: Some(60000.0),
      ..Default::default()
    });

    let line = job_line(&job, now());
    assert!(line.starts_with("Senior Rust Engineer | "));
    assert!(line.contains(&job.salary));
    assert!(line.ends_with("Senior Level | yesterday"));
  }
}

use serde::Serialize;
use std::fmt;

/// Normalized job listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
  pub id: String,
  pub title: String,
  pub company: Company,
  pub location: String,
  pub publication_date: String,
  pub description: String,
  pub short_description: String,
  /// Contract type label ("Permanent", "Contract", or the raw code)
  #[serde(rename = "type")]
  pub job_type: String,
  pub level: JobLevel,
  pub categories: Vec<String>,
  pub landing_page_url: String,
  pub tags: Vec<String>,
  /// Display salary, empty when the listing has no salary bounds
  pub salary: String,
  pub salary_min: Option<f64>,
  pub salary_max: Option<f64>,
  pub contract_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
  pub name: String,
}

/// Seniority inferred from a job title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobLevel {
  #[serde(rename = "Internship")]
  Internship,
  #[serde(rename = "Entry Level")]
  EntryLevel,
  #[serde(rename = "Mid Level")]
  MidLevel,
  #[serde(rename = "Senior Level")]
  SeniorLevel,
  #[serde(rename = "Staff")]
  Staff,
  #[serde(rename = "Management")]
  Management,
}

impl JobLevel {
  pub fn label(self) -> &'static str {
    match self {
      JobLevel::Internship => "Internship",
      JobLevel::EntryLevel => "Entry Level",
      JobLevel::MidLevel => "Mid Level",
      JobLevel::SeniorLevel => "Senior Level",
      JobLevel::Staff => "Staff",
      JobLevel::Management => "Management",
    }
  }
}

impl fmt::Display for JobLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// One page-request intent.
///
/// Empty strings and zero numbers mean "not set"; the request builder
/// substitutes its defaults for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSearchParams {
  pub keywords: String,
  pub location: String,
  pub category: Option<String>,
  pub country: String,
  pub page: u32,
  pub results_per_page: Option<u32>,
  pub sort_by: Option<String>,
  pub contract_type: Option<String>,
  pub contract_time: Option<String>,
  pub salary_min: Option<u32>,
}

impl JobSearchParams {
  /// Same search, different page.
  pub fn with_page(&self, page: u32) -> Self {
    Self {
      page,
      ..self.clone()
    }
  }
}

/// One page of normalized results plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchResult {
  pub jobs: Vec<Job>,
  pub total_results: u64,
  pub current_page: u32,
  pub total_pages: u64,
  pub items_per_page: u32,
}

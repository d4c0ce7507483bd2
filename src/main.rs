mod adzuna;
mod cache;
mod config;
mod countries;
mod display;
mod error;
mod logging;
mod search;
mod session;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};

use crate::adzuna::cached_client::CachedJobClient;
use crate::adzuna::types::JobSearchParams;
use crate::cache::CacheSource;
use crate::config::Config;
use crate::search::{SearchOrchestrator, SearchState};
use crate::session::{EnvSession, SessionProvider};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "jobseek")]
#[command(about = "Search Adzuna job listings from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/jobseek/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Log at debug level
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Search for jobs and print one line per listing
  Search(SearchArgs),
  /// List supported countries
  Countries,
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
  /// Words that must appear in the job title
  keywords: Vec<String>,

  #[arg(short, long)]
  location: Option<String>,

  /// Two-letter country code (default from config)
  #[arg(long)]
  country: Option<String>,

  /// Category tag, e.g. it-jobs
  #[arg(long)]
  category: Option<String>,

  /// Sort order: date, salary, relevance
  #[arg(long)]
  sort: Option<String>,

  /// permanent or contract
  #[arg(long)]
  contract_type: Option<String>,

  /// full_time or part_time
  #[arg(long)]
  contract_time: Option<String>,

  #[arg(long)]
  salary_min: Option<u32>,

  /// Results per page (default from config)
  #[arg(long)]
  per_page: Option<u32>,

  /// Number of pages to load
  #[arg(long, default_value_t = 1)]
  pages: u32,

  /// Times to re-issue a page after a timeout or network failure
  #[arg(long, default_value_t = 0)]
  retries: u32,

  /// Print the loaded jobs as JSON instead of one line each
  #[arg(long)]
  json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init(args.verbose)?;

  let config = Config::load(args.config.as_deref())?;

  let session = EnvSession::from_env();
  if session.is_authenticated() {
    info!(user_id = session.current_user_id(), "signed in");
  } else {
    info!("running as guest");
  }

  match args.command {
    Command::Countries => {
      for country in countries::COUNTRIES {
        println!("{}  {}", country.code, country.name);
      }
      Ok(ExitCode::SUCCESS)
    }
    Command::Search(search_args) => run_search(&config, search_args).await,
  }
}

fn build_params(config: &Config, args: &SearchArgs) -> Result<JobSearchParams> {
  let country = args
    .country
    .clone()
    .unwrap_or_else(|| config.search.default_country.clone());
  if !countries::is_supported(&country) {
    return Err(eyre!(
      "Unsupported country '{}'. Run `jobseek countries` to list supported markets.",
      country
    ));
  }

  Ok(JobSearchParams {
    keywords: args.keywords.join(" "),
    location: args.location.clone().unwrap_or_default(),
    category: args.category.clone(),
    country,
    page: 1,
    results_per_page: Some(args.per_page.unwrap_or(config.search.results_per_page)),
    sort_by: args.sort.clone(),
    contract_type: args.contract_type.clone(),
    contract_time: args.contract_time.clone(),
    salary_min: args.salary_min,
  })
}

/// Tick like an event loop until the outstanding page has been applied.
async fn wait_for_page(search: &mut SearchOrchestrator) {
  let mut tick = tokio::time::interval(POLL_INTERVAL);
  while search.is_loading() {
    tick.tick().await;
    search.poll();
  }
}

/// Wait for the outstanding page, re-issuing it after transient failures.
async fn load_page(search: &mut SearchOrchestrator, mut retries: u32) {
  wait_for_page(search).await;
  while retries > 0 {
    let transient = search
      .session()
      .last_error
      .as_ref()
      .is_some_and(|err| err.kind.is_transient());
    if !transient || !search.retry() {
      break;
    }
    retries -= 1;
    warn!("retrying after transient failure");
    wait_for_page(search).await;
  }
}

async fn run_search(config: &Config, args: SearchArgs) -> Result<ExitCode> {
  let params = build_params(config, &args)?;
  let country = countries::country_name(&params.country);
  let client = CachedJobClient::new(config)?;
  let mut search = SearchOrchestrator::new(client, config.search.prefetch_distance);

  search.search(params);
  load_page(&mut search, args.retries).await;

  let now = chrono::Utc::now();
  let mut printed = 0;

  loop {
    if !args.json {
      for job in &search.jobs()[printed..] {
        println!("{}", display::job_line(job, now));
      }
    }
    printed = search.jobs().len();

    if search.state() == SearchState::Failed {
      break;
    }

    let session = search.session();
    if session.current_page >= args.pages || !session.has_more_pages {
      break;
    }

    // Scroll to the bottom of what has been printed so far
    if !search.notify_visible(printed.saturating_sub(1)) {
      break;
    }
    load_page(&mut search, args.retries).await;
  }

  if args.json {
    println!("{}", serde_json::to_string_pretty(search.jobs())?);
  }

  let session = search.session();
  if let Some(err) = &session.last_error {
    eprintln!("{}", err);
    return Ok(ExitCode::FAILURE);
  }

  let cached = if session.last_source == Some(CacheSource::Cache) {
    ", cached"
  } else {
    ""
  };
  eprintln!(
    "Showing {} of {} jobs in {} (page {} of {}{})",
    session.jobs.len(),
    session.total_results,
    country,
    session.current_page,
    session.total_pages,
    cached
  );

  Ok(ExitCode::SUCCESS)
}

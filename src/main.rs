//! SchoolTracker - client core for tracking school applications
//!
//! Main entry point for the SchoolTracker CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use schooltracker::config::TrackerConfig;
use schooltracker::directory::RefreshOutcome;
use schooltracker::search::SearchResultSet;
use schooltracker::Session;
use std::path::{Path, PathBuf};
use std::process;
use tracker_api::{
    page_window, total_pages, Focus, InstitutionDetail, InstitutionFilters, MetricData, Ordering,
    RankRange, Research, Size, DEFAULT_PAGE_WINDOW,
};

/// SchoolTracker - search and browse your school applications
#[derive(Parser, Debug)]
#[command(name = "schooltracker")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/schooltracker/config.yaml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a default configuration file
    Init,

    /// Search applications, documents, events and institutions
    Search {
        /// Search query (case-insensitive substring)
        query: String,
    },

    /// Browse the institution directory
    Institutions {
        /// Name search
        #[arg(short, long)]
        search: Option<String>,

        /// Country name
        #[arg(short, long)]
        country: Option<String>,

        /// Best rank to include
        #[arg(long)]
        rank_min: Option<u32>,

        /// Worst rank to include
        #[arg(long)]
        rank_max: Option<u32>,

        /// Research intensity (very-high, high, medium, low)
        #[arg(long, value_parser = parse_research)]
        research: Option<Research>,

        /// Size (extra-large, large, medium, small)
        #[arg(long, value_parser = parse_size)]
        size: Option<Size>,

        /// Subject focus (full-comprehensive, comprehensive, focused, specialist)
        #[arg(long, value_parser = parse_focus)]
        focus: Option<Focus>,

        /// Sort key (rank, -rank, name, -name)
        #[arg(short, long, allow_hyphen_values = true)]
        ordering: Option<Ordering>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Results per page
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },

    /// Show details for one institution
    Show {
        /// Institution ID
        id: String,
    },

    /// List countries present in the directory
    Countries,

    /// Remove cached institution data
    ClearCache,
}

fn main() {
    if let Err(e) = schooltracker::logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(TrackerConfig::default_path);

    match cli.command {
        Commands::Init => handle_init_command(&config_path),
        Commands::Search { query } => {
            let session = open_session(&config_path)?;
            block_on(handle_search(session, query))
        }
        Commands::Institutions {
            search,
            country,
            rank_min,
            rank_max,
            research,
            size,
            focus,
            ordering,
            page,
            page_size,
        } => {
            let filters = InstitutionFilters {
                search,
                country,
                rank_range: RankRange {
                    gte: rank_min,
                    lte: rank_max,
                },
                research,
                size,
                focus,
                page: Some(page),
                page_size: Some(page_size),
                ordering,
            };
            let session = open_session(&config_path)?;
            block_on(handle_institutions(session, filters))
        }
        Commands::Show { id } => {
            let session = open_session(&config_path)?;
            block_on(async move {
                let detail = session
                    .catalog()
                    .institution(&id)
                    .await
                    .with_context(|| format!("Failed to load institution {}", id))?;
                print_institution_detail(&detail);
                Ok(())
            })
        }
        Commands::Countries => {
            let session = open_session(&config_path)?;
            block_on(async move {
                let countries = session.catalog().countries().await;
                if countries.is_empty() {
                    println!("No countries available.");
                }
                for country in countries {
                    println!("{}", country);
                }
                Ok(())
            })
        }
        Commands::ClearCache => {
            let session = open_session(&config_path)?;
            session.clear_caches().context("Failed to clear caches")?;
            println!("✓ Cleared cached institution data");
            Ok(())
        }
    }
}

/// Load the config file if there is one, otherwise use defaults
fn open_session(config_path: &Path) -> anyhow::Result<Session> {
    let config = if config_path.exists() {
        TrackerConfig::load(config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?
    } else {
        tracing::info!(
            path = %config_path.display(),
            "No configuration file, using defaults"
        );
        TrackerConfig::default()
    };

    Session::init(config).context("Failed to set up session")
}

fn block_on<F>(future: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = anyhow::Result<()>>,
{
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(future)
}

fn handle_init_command(config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() {
        println!("Configuration already exists at {}", config_path.display());
        return Ok(());
    }

    TrackerConfig::new()
        .save(config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✓ Created configuration at {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set api.base_url in the file if the API is not on localhost");
    println!("  2. Export your token: export SCHOOLTRACKER_TOKEN=...");
    println!("  3. Try: schooltracker search <query>");
    Ok(())
}

async fn handle_search(mut session: Session, query: String) -> anyhow::Result<()> {
    let (_, outcome) = tokio::join!(session.load_collections(), session.refresh_directory());
    if outcome == RefreshOutcome::Failed {
        eprintln!("Warning: institution directory unavailable, results may be incomplete");
    }

    session.search(&query);
    if let Some(message) = session.aggregator().no_results_message() {
        println!("{}", message);
        return Ok(());
    }

    print_results(session.aggregator().results());
    Ok(())
}

fn print_results(results: &SearchResultSet) {
    if !results.applications.is_empty() {
        println!("Applications:");
        for app in &results.applications {
            println!(
                "  [{}] {} - {} ({}, {})",
                app.id,
                app.institution_label(),
                app.program_name,
                app.degree_type.as_ref().map_or("-", |degree| degree.as_str()),
                app.status
            );
        }
        println!();
    }

    if !results.documents.is_empty() {
        println!("Documents:");
        for doc in &results.documents {
            println!("  [{}] {} ({})", doc.id, doc.file_name, doc.document_type);
        }
        println!();
    }

    if !results.events.is_empty() {
        println!("Events:");
        for event in &results.events {
            println!("  [{}] {} on {}", event.id, event.event_title, event.event_date);
        }
        println!();
    }

    if !results.institutions.is_empty() {
        println!("Institutions:");
        for institution in &results.institutions {
            println!(
                "  [{}] {} ({})",
                institution.id, institution.name, institution.country
            );
        }
    }
}

async fn handle_institutions(session: Session, filters: InstitutionFilters) -> anyhow::Result<()> {
    let page = session
        .catalog()
        .list(&filters)
        .await
        .context("Failed to list institutions")?;

    if page.results.is_empty() {
        println!("No institutions found.");
        return Ok(());
    }

    println!("Found {} institutions:", page.count);
    println!();
    for institution in &page.results {
        let score = if institution.overall_score.is_empty() {
            "-"
        } else {
            institution.overall_score.as_str()
        };
        println!(
            "  #{:<5} {:<50} {:<20} {}",
            institution.rank, institution.name, institution.country, score
        );
    }

    let current = filters.page.unwrap_or(1);
    let total = total_pages(page.count, filters.page_size.unwrap_or(20));
    if total > 1 {
        let window: Vec<String> = page_window(current, total, DEFAULT_PAGE_WINDOW)
            .into_iter()
            .map(|p| {
                if p == current {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect();
        println!();
        println!("Page {} of {}: {}", current, total, window.join(" "));
    }

    Ok(())
}

fn print_institution_detail(detail: &InstitutionDetail) {
    println!("{}: {}", detail.id(), detail.name());
    println!("Country: {}", detail.summary.country);
    println!("Rank: {}", detail.summary.rank);
    if !detail.summary.overall_score.is_empty() {
        println!("Overall score: {}", detail.summary.overall_score);
    }
    if !detail.web_links.is_empty() {
        println!("Website: {}", detail.web_links);
    }

    if let Some(ref classification) = detail.classification {
        println!();
        println!("Size: {}", classification.size.as_str());
        println!("Focus: {}", classification.focus.as_str());
        println!("Research: {}", classification.research.as_str());
    }

    let metrics: [(&str, &Option<MetricData>); 9] = [
        ("Academic reputation", &detail.academic_reputation),
        ("Employer reputation", &detail.employer_reputation),
        ("Faculty/student ratio", &detail.faculty_student),
        ("Citations per faculty", &detail.citations_per_faculty),
        ("International faculty", &detail.international_faculty),
        ("International students", &detail.international_students),
        ("International research network", &detail.international_research_network),
        ("Employment outcomes", &detail.employment_outcomes),
        ("Sustainability", &detail.sustainability),
    ];
    let present: Vec<(&str, &MetricData)> = metrics
        .into_iter()
        .filter_map(|(label, metric)| Some((label, metric.as_ref()?)))
        .collect();

    if !present.is_empty() {
        println!();
        println!("Metrics:");
        for (label, metric) in present {
            println!("  {:<32} score {:<6} rank {}", label, metric.score, metric.rank);
        }
    }
}

fn parse_research(value: &str) -> Result<Research, String> {
    match normalize_choice(value).as_str() {
        "very-high" => Ok(Research::VeryHigh),
        "high" => Ok(Research::High),
        "medium" => Ok(Research::Medium),
        "low" => Ok(Research::Low),
        _ => Err(format!(
            "unknown research level '{}' (expected very-high, high, medium or low)",
            value
        )),
    }
}

fn parse_size(value: &str) -> Result<Size, String> {
    match normalize_choice(value).as_str() {
        "extra-large" => Ok(Size::ExtraLarge),
        "large" => Ok(Size::Large),
        "medium" => Ok(Size::Medium),
        "small" => Ok(Size::Small),
        _ => Err(format!(
            "unknown size '{}' (expected extra-large, large, medium or small)",
            value
        )),
    }
}

fn parse_focus(value: &str) -> Result<Focus, String> {
    match normalize_choice(value).as_str() {
        "full-comprehensive" => Ok(Focus::FullComprehensive),
        "comprehensive" => Ok(Focus::Comprehensive),
        "focused" => Ok(Focus::Focused),
        "specialist" => Ok(Focus::Specialist),
        _ => Err(format!(
            "unknown focus '{}' (expected full-comprehensive, comprehensive, focused or specialist)",
            value
        )),
    }
}

/// Accept both the wire spelling ("Very High") and the flag spelling ("very-high")
fn normalize_choice(value: &str) -> String {
    value.trim().to_lowercase().replace([' ', '_'], "-")
}

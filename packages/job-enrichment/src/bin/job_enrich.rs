//! Job listings CLI
//!
//! Fetches the listings page, parses its rows and optionally enriches them
//! with the skills found on each posting's detail page.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use job_enrichment::{
    fetch_listings, parse_listings, DetailCache, DetailFetcher, EnrichOptions, Enricher,
    EnrichmentConfig, HttpSession, SummaryRecord,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "job-enrich")]
#[command(about = "List, enrich and filter KU job postings")]
struct Cli {
    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    /// Listings page to fetch (defaults to ENRICH_LISTINGS_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the listings as parsed
    List,

    /// Add skills from each posting's detail page
    Enrich {
        /// Only enrich the first N postings
        #[arg(long)]
        limit: Option<usize>,

        /// Concurrent detail fetches
        #[arg(long)]
        workers: Option<usize>,

        /// Look for these skills instead of the built-in vocabulary
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
    },

    /// Keep postings that mention at least one skill
    Filter {
        /// Skills to look for, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        skills: Vec<String>,

        /// Only check the first N postings
        #[arg(long)]
        limit: Option<usize>,

        /// Concurrent detail fetches
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_enrichment=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = EnrichmentConfig::from_env().context("Invalid enrichment configuration")?;
    if let Some(url) = cli.url {
        config = config.with_listings_url(url);
    }

    let session = Arc::new(
        HttpSession::builder()
            .timeout(config.listing_timeout)
            .build()
            .context("Failed to build HTTP session")?,
    );

    let html = match fetch_listings(session.as_ref(), &config.listings_url, config.listing_timeout).await
    {
        Ok(html) => html,
        Err(e) => {
            eprintln!("Error fetching list page: {}", e);
            return Ok(ExitCode::from(1));
        }
    };

    let mut records = parse_listings(&html, &config.listings_url)
        .with_context(|| format!("Failed to parse listings from {}", config.listings_url))?;
    if records.is_empty() {
        eprintln!("No jobs parsed from list page. The page structure may have changed.");
        return Ok(ExitCode::from(2));
    }

    let cache = Arc::new(DetailCache::new(config.cache));
    let enricher = Enricher::new(
        DetailFetcher::new(session, cache).with_timeout(config.detail_timeout),
    );
    let options = |limit: Option<usize>, workers: Option<usize>| EnrichOptions {
        limit: limit.or(config.limit),
        workers: workers.unwrap_or(config.workers),
    };

    let records = match cli.command {
        Commands::List => records,
        Commands::Enrich {
            limit,
            workers,
            skills,
        } => {
            let report = enricher
                .enrich(&mut records, &skills, &options(limit, workers))
                .await;
            tracing::info!(
                selected = report.selected,
                enriched = report.enriched,
                failed = report.failed,
                "Enrich finished"
            );
            records
        }
        Commands::Filter {
            skills,
            limit,
            workers,
        } => {
            enricher
                .filter(records, &skills, &options(limit, workers))
                .await
        }
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("Failed to serialize records")?
        );
    } else {
        print_table(&records);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_table(records: &[SummaryRecord]) {
    let show_skills = records.iter().any(SummaryRecord::is_enriched);

    let mut headers = vec![
        "Title",
        "Category",
        "ID",
        "Department",
        "Campus",
        "Reg/Temp",
        "Review Begins",
        "URL",
    ];
    if show_skills {
        headers.push("Skills");
    }

    let header_line = headers.join(" | ");
    println!("{}", header_line);
    println!("{}", "-".repeat(header_line.len().max(120)));

    for record in records {
        let mut columns = vec![
            truncate(&record.title, 40),
            record.category.clone().unwrap_or_default(),
            record.posting_id.clone().unwrap_or_default(),
            truncate(record.department.as_deref().unwrap_or_default(), 24),
            truncate(record.campus.as_deref().unwrap_or_default(), 24),
            record.employment_type.clone().unwrap_or_default(),
            record.review_begins.clone().unwrap_or_default(),
            record.detail_url.clone(),
        ];
        if show_skills {
            columns.push(record.skills().join(", "));
        }
        println!("{}", columns.join(" | "));
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

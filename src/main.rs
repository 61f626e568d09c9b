use clap::{Parser, Subcommand};
use event_browse::config::BrowseConfig;
use event_browse::logging;
use event_browse::pipeline::{run_query, upcoming_now, QueryOutcome};
use event_browse::source::{EventSource, JsonFileEventSource};
use event_browse::{BrowseSession, EventRecord, SortKey};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "event_browse")]
#[command(about = "Search, filter and sort event listings")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to browse.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and sort the listing once
    Search {
        /// JSON fixture with an array of events (overrides the configured source)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Case-insensitive substring of title or venue
        #[arg(long, default_value = "")]
        query: String,
        /// One of: date_asc, date_desc, price_asc, price_desc, popularity
        #[arg(long)]
        sort: Option<SortKey>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the next events after the current time
    Upcoming {
        #[arg(long)]
        file: Option<PathBuf>,
        /// Maximum number of events to show
        #[arg(long)]
        cap: Option<usize>,
    },
    /// Read keystrokes from stdin, one raw query per line; `:sort <key>` changes the sort
    Interactive {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<BrowseConfig> {
    let config = match path {
        Some(path) => BrowseConfig::load_from(path)?,
        None => BrowseConfig::load()?,
    };
    Ok(config)
}

fn pick_source(config: &BrowseConfig, file: Option<PathBuf>) -> anyhow::Result<Arc<dyn EventSource>> {
    match file {
        Some(path) => Ok(Arc::new(JsonFileEventSource::new(path))),
        None => Ok(config.build_source()?),
    }
}

fn format_event(event: &EventRecord) -> String {
    let venue = event.venue_name.as_deref().unwrap_or("-");
    let price = event
        .price()
        .map(|p| format!("from {:.2}", p))
        .unwrap_or_else(|| "no tickets".to_string());
    format!("{:<26} {:<32} @ {:<20} {}", event.date, event.title, venue, price)
}

fn print_outcome(outcome: &QueryOutcome) {
    if outcome.is_empty() {
        println!("No events match ({} candidates)", outcome.total_candidates);
        return;
    }
    for event in &outcome.events {
        println!("{}", format_event(event));
    }
    println!("{} of {} events", outcome.len(), outcome.total_candidates);
}

async fn run_interactive(session: BrowseSession, quiet: Duration) -> anyhow::Result<()> {
    let mut rx = session.subscribe();
    let printer = tokio::spawn(async move {
        let mut shown: Option<(String, SortKey)> = None;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let current = (state.query.settled().to_string(), state.sort);
            if shown.as_ref() == Some(&current) {
                continue;
            }
            println!("\n[query {:?}, sort {}]", current.0, current.1);
            print_outcome(&state.outcome);
            shown = Some(current);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(key) = line.strip_prefix(":sort ") {
            match key.parse::<SortKey>() {
                Ok(sort) => session.select_sort(sort),
                Err(e) => warn!("{}", e),
            }
            continue;
        }
        session.type_query(line);
    }

    // Let the last keystroke settle before tearing down
    tokio::time::sleep(quiet + Duration::from_millis(50)).await;
    session.dispose();
    printer.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Search {
            file,
            query,
            sort,
            json,
        } => {
            let source = pick_source(&config, file)?;
            let candidates = source.fetch_all().await?;
            let sort = sort.unwrap_or(config.default_sort);
            info!(query = %query, sort = %sort, "Running search");
            let outcome = run_query(&candidates, &query, sort);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        Commands::Upcoming { file, cap } => {
            let source = pick_source(&config, file)?;
            let candidates = source.fetch_all().await?;
            let cap = cap.unwrap_or(config.upcoming_cap);
            let events = upcoming_now(&candidates, cap);
            if events.is_empty() {
                println!("Nothing upcoming");
            }
            for event in &events {
                println!("{}", format_event(event));
            }
        }
        Commands::Interactive { file } => {
            let source = pick_source(&config, file)?;
            let session = match BrowseSession::mount(source, &config).await {
                Ok(session) => session,
                Err(e) => {
                    error!("Failed to mount browse session: {}", e);
                    return Err(e.into());
                }
            };
            run_interactive(session, config.debounce()).await?;
        }
    }

    Ok(())
}

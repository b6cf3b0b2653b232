mod db;
mod export;
mod fetch;
mod parser;
mod scrape;
mod settings;
mod text;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use fetch::HttpSource;
use settings::Settings;
use text::{LookupTables, TextCleaner};

#[derive(Parser)]
#[command(name = "kijiji_scraper", about = "Kijiji real-estate scraper and text normalizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape index pages 1..=N concurrently and upsert listings into SQLite
    Scrape {
        /// Number of index pages to scrape
        #[arg(short = 'n', long, default_value = "2")]
        pages: u32,
        /// SQLite database path
        #[arg(long)]
        db: Option<String>,
        /// Worker pool size (default: min(32, cpus + 4))
        #[arg(short, long)]
        workers: Option<usize>,
    },
    /// Scrape a single index page into a CSV file (no de-duplication)
    Export {
        /// Index page to scrape
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Output CSV path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Normalize text: lowercase, strip markup/links/punctuation/emoji, expand acronyms and contractions
    Clean {
        /// Text to clean (omit to read --input or stdin)
        #[arg(conflicts_with = "input")]
        text: Option<String>,
        /// File with one text per line
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Local acronyms JSON (default: fetch from the configured URL)
        #[arg(long, requires = "contractions")]
        acronyms: Option<PathBuf>,
        /// Local contractions JSON (default: fetch from the configured URL)
        #[arg(long, requires = "acronyms")]
        contractions: Option<PathBuf>,
    },
    /// Show row counts and missing-field counts for the listings table
    Stats {
        /// SQLite database path
        #[arg(long)]
        db: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load().context("Failed to load settings")?;

    match cli.command {
        Commands::Scrape { pages, db, workers } => {
            if pages == 0 {
                bail!("--pages must be at least 1");
            }
            if let Some(db) = db {
                settings.db_path = db;
            }
            if workers.is_some() {
                settings.workers = workers;
            }

            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            drop(conn);

            let source = Arc::new(HttpSource::new(&settings)?);
            let settings = Arc::new(settings);
            println!("Scraping {} pages into {}...", pages, settings.db_path);
            let summary = scrape::scrape_pages(source, Arc::clone(&settings), pages).await?;
            println!(
                "Done: {} pages, {} listings upserted.",
                summary.pages, summary.listings
            );
        }
        Commands::Export { page, out } => {
            if page == 0 {
                bail!("--page must be at least 1");
            }
            let out = out.unwrap_or_else(|| PathBuf::from(&settings.csv_path));
            let source = HttpSource::new(&settings)?;
            let rows = scrape::collect_page(&source, &settings, page).await?;
            export::write_csv_file(&out, &rows)?;
            println!("Wrote {} listings to {}", rows.len(), out.display());
        }
        Commands::Clean {
            text: single,
            input,
            acronyms,
            contractions,
        } => {
            let tables = match (acronyms, contractions) {
                (Some(a), Some(c)) => LookupTables::from_files(a, c)?,
                _ => {
                    let client = reqwest::Client::builder()
                        .user_agent(&settings.user_agent)
                        .build()?;
                    LookupTables::fetch(&client, &settings.acronyms_url, &settings.contractions_url)
                        .await?
                }
            };
            let cleaner = TextCleaner::new(tables);

            if let Some(single) = single {
                println!("{}", cleaner.clean(&single));
            } else {
                let lines = match input {
                    Some(path) => std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?
                        .lines()
                        .map(str::to_string)
                        .collect::<Vec<_>>(),
                    None => std::io::stdin()
                        .lock()
                        .lines()
                        .collect::<Result<Vec<_>, _>>()?,
                };
                info!("Cleaning {} lines", lines.len());
                for line in text::clean_lines(&cleaner, &lines) {
                    println!("{}", line);
                }
            }
        }
        Commands::Stats { db } => {
            if let Some(db) = db {
                settings.db_path = db;
            }
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Listings:  {}", s.total);
            println!("Unkeyed:   {}  (stored under \"N/A\")", s.unkeyed);
            println!("\nMissing values per column:");
            for (col, n) in &s.missing {
                println!("  {:<22} {:>6}", col, n);
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn table_paths_come_in_pairs() {
        let only_one = ["kijiji_scraper", "clean", "x", "--acronyms", "a.json"];
        assert!(Cli::try_parse_from(only_one).is_err());
        let both = [
            "kijiji_scraper",
            "clean",
            "x",
            "--acronyms",
            "a.json",
            "--contractions",
            "c.json",
        ];
        assert!(Cli::try_parse_from(both).is_ok());
    }

    #[test]
    fn inline_text_and_input_file_conflict() {
        let both = ["kijiji_scraper", "clean", "x", "--input", "lines.txt"];
        assert!(Cli::try_parse_from(both).is_err());
        let file_only = ["kijiji_scraper", "clean", "--input", "lines.txt"];
        assert!(Cli::try_parse_from(file_only).is_ok());
    }

    #[test]
    fn durations() {
        use std::time::Duration;
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 2m 5s");
    }
}

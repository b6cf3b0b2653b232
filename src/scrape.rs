use std::sync::Arc;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::db::{self, ListingRow};
use crate::fetch::PageSource;
use crate::parser::card::{self, CardFields};
use crate::parser::detail::{self, Detail};
use crate::parser::{self, Extracted};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page {page}: index fetch failed: {cause:#}")]
    PageFetch { page: u32, cause: anyhow::Error },
    #[error("page {page}: could not store {url}: {cause:#}")]
    Store {
        page: u32,
        url: String,
        cause: anyhow::Error,
    },
    #[error("worker task failed: {0}")]
    Worker(#[from] JoinError),
}

/// Totals returned after a successful run.
pub struct ScrapeSummary {
    pub pages: u32,
    pub listings: usize,
}

/// Scrape pages `1..=num_pages` on a bounded pool, upserting as records
/// arrive. Every page runs to completion; the first failure (in completion
/// order) is returned once all have finished.
pub async fn scrape_pages<S: PageSource>(
    source: Arc<S>,
    settings: Arc<Settings>,
    num_pages: u32,
) -> Result<ScrapeSummary, ScrapeError> {
    let workers = settings.worker_count();
    let semaphore = Arc::new(Semaphore::new(workers));
    info!("Scraping {} pages with {} workers", num_pages, workers);

    let pb = ProgressBar::new(u64::from(num_pages));
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    // All pages are queued up front; the semaphore bounds how many run.
    let mut tasks = JoinSet::new();
    for page in 1..=num_pages {
        let source = Arc::clone(&source);
        let settings = Arc::clone(&settings);
        let sem = Arc::clone(&semaphore);

        tasks.spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore is never closed");
            let result = scrape_page(source.as_ref(), &settings, page).await;
            (page, result)
        });
    }

    let mut first_err = None;
    let mut listings = 0usize;

    while let Some(joined) = tasks.join_next().await {
        pb.inc(1);
        match joined {
            Ok((page, Ok(n))) => {
                debug!("Page {} done ({} listings)", page, n);
                listings += n;
            }
            Ok((page, Err(e))) => {
                warn!("Page {} failed: {}", page, e);
                first_err.get_or_insert(e);
            }
            Err(e) => {
                warn!("Page task aborted: {}", e);
                first_err.get_or_insert(ScrapeError::Worker(e));
            }
        }
    }

    pb.finish_and_clear();

    match first_err {
        Some(e) => Err(e),
        None => {
            info!("Scraped {} pages, {} listings", num_pages, listings);
            Ok(ScrapeSummary {
                pages: num_pages,
                listings,
            })
        }
    }
}

/// Fetch one index page, complete every card with its detail page and
/// upsert it. Returns the number of cards found; zero is not an error.
pub async fn scrape_page<S: PageSource>(
    source: &S,
    settings: &Settings,
    page: u32,
) -> Result<usize, ScrapeError> {
    let cards = fetch_cards(source, settings, page)
        .await
        .map_err(|cause| ScrapeError::PageFetch { page, cause })?;
    let count = cards.len();

    for card in cards {
        let row = build_listing(source, card).await;
        store(&settings.db_path, row, page).await?;
    }

    Ok(count)
}

/// Same walk as [`scrape_page`] but returns the records instead of storing them.
pub async fn collect_page<S: PageSource>(
    source: &S,
    settings: &Settings,
    page: u32,
) -> Result<Vec<ListingRow>> {
    let cards = fetch_cards(source, settings, page).await?;
    let mut rows = Vec::with_capacity(cards.len());
    for card in cards {
        rows.push(build_listing(source, card).await);
    }
    Ok(rows)
}

async fn fetch_cards<S: PageSource>(
    source: &S,
    settings: &Settings,
    page: u32,
) -> Result<Vec<CardFields>> {
    let url = settings.index_url(page);
    let html = source.fetch(&url).await?;
    let cards = card::extract_cards(&html, &settings.link_base);
    info!("Page {}: {} listing cards", page, cards.len());
    Ok(cards)
}

/// Detail pages are fetched one at a time, in card order.
async fn build_listing<S: PageSource>(source: &S, card: CardFields) -> ListingRow {
    let detail = fetch_detail(source, &card.permalink).await;
    parser::assemble(card, detail)
}

/// Any failure here degrades to the missing pair instead of propagating.
pub async fn fetch_detail<S: PageSource>(source: &S, permalink: &Extracted) -> Detail {
    let Some(url) = permalink.as_deref() else {
        return Detail::missing();
    };
    match source.fetch(url).await {
        Ok(html) => detail::parse_detail(&html),
        Err(e) => {
            debug!("Detail fetch failed for {}: {:#}", url, e);
            Detail::missing()
        }
    }
}

async fn store(db_path: &str, row: ListingRow, page: u32) -> Result<(), ScrapeError> {
    let path = db_path.to_string();
    let url = row.url.clone();
    tokio::task::spawn_blocking(move || db::upsert_listing(&path, &row))
        .await?
        .map_err(|cause| ScrapeError::Store { page, url, cause })
}

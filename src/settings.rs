use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "kijiji";
const ENV_PREFIX: &str = "KIJIJI";

/// Runtime settings: defaults, then `kijiji.toml`, then `KIJIJI_*` env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub region_slug: String,
    pub category_path: String,
    /// Prefix joined onto each card's anchor href to form the permalink.
    pub link_base: String,
    pub db_path: String,
    pub csv_path: String,
    pub workers: Option<usize>,
    pub user_agent: String,
    pub request_timeout_secs: Option<u64>,
    pub acronyms_url: String,
    pub contractions_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://www.kijiji.ca".into(),
            region_slug: "gta-greater-toronto-area".into(),
            category_path: "c34l1700272".into(),
            link_base: "https://kijiji.ca/".into(),
            db_path: "kijiji_real_estate_gta.db".into(),
            csv_path: "kijiji_real_estate_gta.csv".into(),
            workers: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
            request_timeout_secs: None,
            acronyms_url: "https://raw.githubusercontent.com/sugatagh/E-commerce-Text-Classification/main/JSON/english_acronyms.json".into(),
            contractions_url: "https://raw.githubusercontent.com/sugatagh/E-commerce-Text-Classification/main/JSON/english_contractions.json".into(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Listing-index URL for a 1-based page number.
    pub fn index_url(&self, page: u32) -> String {
        format!(
            "{}/b-real-estate/{}+/page-{}/{}",
            self.base_url.trim_end_matches('/'),
            self.region_slug,
            page,
            self.category_path
        )
    }

    /// Worker pool size; falls back to `min(32, cpus + 4)`.
    pub fn worker_count(&self) -> usize {
        self.workers.filter(|&n| n > 0).unwrap_or_else(|| {
            let cpus = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            (cpus + 4).min(32)
        })
    }
}

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Short form → expansion. Expansions are space-separated phrases.
pub type Lookup = HashMap<String, String>;

/// The two dictionaries the cleaner expands against. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    pub acronyms: Lookup,
    pub contractions: Lookup,
}

impl LookupTables {
    pub fn new(acronyms: Lookup, contractions: Lookup) -> Self {
        Self {
            acronyms,
            contractions,
        }
    }

    /// Both tables as JSON objects of string → string.
    pub fn from_json(acronyms: &str, contractions: &str) -> Result<Self> {
        let acronyms = serde_json::from_str(acronyms).context("Invalid acronyms table")?;
        let contractions =
            serde_json::from_str(contractions).context("Invalid contractions table")?;
        Ok(Self::new(acronyms, contractions))
    }

    pub fn from_files(acronyms: impl AsRef<Path>, contractions: impl AsRef<Path>) -> Result<Self> {
        let read = |p: &Path| {
            std::fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display()))
        };
        Self::from_json(&read(acronyms.as_ref())?, &read(contractions.as_ref())?)
    }

    /// Download both tables. No fallback: any failure is returned.
    pub async fn fetch(
        client: &reqwest::Client,
        acronyms_url: &str,
        contractions_url: &str,
    ) -> Result<Self> {
        let acronyms = fetch_table(client, acronyms_url).await?;
        let contractions = fetch_table(client, contractions_url).await?;
        info!(
            "Loaded {} acronyms and {} contractions",
            acronyms.len(),
            contractions.len()
        );
        Ok(Self::new(acronyms, contractions))
    }
}

async fn fetch_table(client: &reqwest::Client, url: &str) -> Result<Lookup> {
    let table = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Failed to fetch {url}"))?
        .json::<Lookup>()
        .await
        .with_context(|| format!("Invalid lookup table at {url}"))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn parses_json_objects() {
        let t = LookupTables::from_json(
            r#"{"idk": "i do not know", "brb": "be right back"}"#,
            r#"{"don't": "do not"}"#,
        )
        .unwrap();
        assert_eq!(t.acronyms.len(), 2);
        assert_eq!(t.acronyms["brb"], "be right back");
        assert_eq!(t.contractions["don't"], "do not");
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(LookupTables::from_json(r#"{"idk": 1}"#, "{}").is_err());
        assert!(LookupTables::from_json("{}", "[]").is_err());
    }

    #[test]
    fn reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("acronyms.json");
        let c = dir.path().join("contractions.json");
        std::fs::write(&a, r#"{"asap": "as soon as possible"}"#).unwrap();
        std::fs::write(&c, r#"{"can't": "cannot"}"#).unwrap();

        let t = LookupTables::from_files(&a, &c).unwrap();
        assert_eq!(t.acronyms["asap"], "as soon as possible");
        assert_eq!(t.contractions["can't"], "cannot");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LookupTables::from_files(dir.path().join("a.json"), dir.path().join("c.json"))
            .unwrap_err();
        assert!(err.to_string().contains("a.json"));
    }

    #[tokio::test]
    async fn fetches_both_tables() {
        let mut server = Server::new_async().await;
        let acronyms = server
            .mock("GET", "/acronyms.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"imo": "in my opinion"}"#)
            .create_async()
            .await;
        let contractions = server
            .mock("GET", "/contractions.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"it's": "it is"}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let t = LookupTables::fetch(
            &client,
            &format!("{}/acronyms.json", server.url()),
            &format!("{}/contractions.json", server.url()),
        )
        .await
        .unwrap();
        assert_eq!(t.acronyms["imo"], "in my opinion");
        assert_eq!(t.contractions["it's"], "it is");
        acronyms.assert_async().await;
        contractions.assert_async().await;
    }

    #[tokio::test]
    async fn missing_table_is_fatal() {
        let mut server = Server::new_async().await;
        let _acronyms = server
            .mock("GET", "/acronyms.json")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let _contractions = server
            .mock("GET", "/contractions.json")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let err = LookupTables::fetch(
            &client,
            &format!("{}/acronyms.json", server.url()),
            &format!("{}/contractions.json", server.url()),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("contractions.json"));
    }

    #[tokio::test]
    async fn unreachable_table_is_fatal() {
        let client = reqwest::Client::new();
        let result = LookupTables::fetch(
            &client,
            "http://127.0.0.1:1/acronyms.json",
            "http://127.0.0.1:1/contractions.json",
        )
        .await;
        assert!(result.is_err());
    }
}

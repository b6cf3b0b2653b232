use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use rusqlite::Connection;

use crate::parser::NOT_AVAILABLE;

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Columns other than the `url` key, in schema order.
pub const VALUE_COLUMNS: [&str; 12] = [
    "title",
    "price",
    "region",
    "nearest_intersection",
    "bedrooms",
    "bathrooms",
    "unit_type",
    "parking_included",
    "size_sqft",
    "pets_friendly",
    "address",
    "description",
];

pub fn connect(path: impl AsRef<Path>) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS properties (
            url                  TEXT PRIMARY KEY,
            title                TEXT,
            price                TEXT,
            region               TEXT,
            nearest_intersection TEXT,
            bedrooms             TEXT,
            bathrooms            TEXT,
            unit_type            TEXT,
            parking_included     TEXT,
            size_sqft            TEXT,
            pets_friendly        TEXT,
            address              TEXT,
            description          TEXT
        );
        ",
    )?;
    Ok(())
}

/// One scraped listing, every field rendered to text ("N/A" when absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub url: String,
    pub title: String,
    pub price: String,
    pub region: String,
    pub nearest_intersection: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub unit_type: String,
    pub parking_included: String,
    pub size_sqft: String,
    pub pets_friendly: String,
    pub address: String,
    pub description: String,
}

// ── Writes ──

/// Insert-or-replace keyed by `url`. Opens, writes and closes its own
/// connection; there is no batching across records.
pub fn upsert_listing(path: impl AsRef<Path>, row: &ListingRow) -> Result<()> {
    let conn = connect(path)?;
    conn.execute(
        "INSERT OR REPLACE INTO properties (
            url, title, price, region, nearest_intersection, bedrooms,
            bathrooms, unit_type, parking_included, size_sqft, pets_friendly,
            address, description
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        rusqlite::params![
            row.url,
            row.title,
            row.price,
            row.region,
            row.nearest_intersection,
            row.bedrooms,
            row.bathrooms,
            row.unit_type,
            row.parking_included,
            row.size_sqft,
            row.pets_friendly,
            row.address,
            row.description,
        ],
    )?;
    Ok(())
}

// ── Reads ──

#[cfg(test)]
pub(crate) fn fetch_listing(conn: &Connection, url: &str) -> Result<Option<ListingRow>> {
    use rusqlite::OptionalExtension;

    let row = conn
        .query_row(
            "SELECT url, title, price, region, nearest_intersection, bedrooms,
                    bathrooms, unit_type, parking_included, size_sqft, pets_friendly,
                    address, description
             FROM properties WHERE url = ?1",
            [url],
            |r| {
                Ok(ListingRow {
                    url: r.get(0)?,
                    title: r.get(1)?,
                    price: r.get(2)?,
                    region: r.get(3)?,
                    nearest_intersection: r.get(4)?,
                    bedrooms: r.get(5)?,
                    bathrooms: r.get(6)?,
                    unit_type: r.get(7)?,
                    parking_included: r.get(8)?,
                    size_sqft: r.get(9)?,
                    pets_friendly: r.get(10)?,
                    address: r.get(11)?,
                    description: r.get(12)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

pub fn count_listings(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM properties", [], |r| r.get(0))?)
}

pub struct Stats {
    pub total: i64,
    /// Rows stored under the "N/A" key (listings with no permalink collapse here).
    pub unkeyed: i64,
    /// Per value column, how many rows hold the "N/A" sentinel.
    pub missing: Vec<(&'static str, i64)>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total = count_listings(conn)?;
    let unkeyed = conn.query_row(
        "SELECT COUNT(*) FROM properties WHERE url = ?1",
        [NOT_AVAILABLE],
        |r| r.get(0),
    )?;

    let mut missing = Vec::with_capacity(VALUE_COLUMNS.len());
    for col in VALUE_COLUMNS {
        // column names come from the fixed list above, never from input
        let n: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM properties WHERE {col} = ?1"),
            [NOT_AVAILABLE],
            |r| r.get(0),
        )?;
        missing.push((col, n));
    }

    Ok(Stats {
        total,
        unkeyed,
        missing,
    })
}

#[cfg(test)]
pub(crate) fn sample_row(url: &str) -> ListingRow {
    ListingRow {
        url: url.to_string(),
        title: "Bright 2 Bedroom Condo Downtown".into(),
        price: "$2,650.00".into(),
        region: "City of Toronto".into(),
        nearest_intersection: "King St W / Spadina Ave".into(),
        bedrooms: "2".into(),
        bathrooms: "1".into(),
        unit_type: "Condo".into(),
        parking_included: "1".into(),
        size_sqft: "750".into(),
        pets_friendly: "Yes".into(),
        address: "375 King St W, Toronto, ON M5V 1K5".into(),
        description: "Spacious corner unit.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.db");
        init_schema(&connect(&path).unwrap()).unwrap();
        (dir, path)
    }

    #[test]
    fn schema_is_idempotent() {
        let (_dir, path) = temp_db();
        let conn = connect(&path).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(count_listings(&conn).unwrap(), 0);
    }

    #[test]
    fn upsert_inserts_then_replaces() {
        let (_dir, path) = temp_db();
        let url = "https://kijiji.ca//v-apartments-condos/1700001";

        upsert_listing(&path, &sample_row(url)).unwrap();
        let mut newer = sample_row(url);
        newer.price = "$2,500.00".into();
        newer.description = "N/A".into();
        upsert_listing(&path, &newer).unwrap();

        let conn = connect(&path).unwrap();
        assert_eq!(count_listings(&conn).unwrap(), 1);
        assert_eq!(fetch_listing(&conn, url).unwrap(), Some(newer));
    }

    #[test]
    fn distinct_keys_are_distinct_rows() {
        let (_dir, path) = temp_db();
        upsert_listing(&path, &sample_row("https://kijiji.ca/a")).unwrap();
        upsert_listing(&path, &sample_row("https://kijiji.ca/b")).unwrap();
        let conn = connect(&path).unwrap();
        assert_eq!(count_listings(&conn).unwrap(), 2);
        assert!(fetch_listing(&conn, "https://kijiji.ca/c").unwrap().is_none());
    }

    #[test]
    fn upsert_without_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        assert!(upsert_listing(&path, &sample_row("x")).is_err());
    }

    #[test]
    fn stats_count_sentinels() {
        let (_dir, path) = temp_db();
        let mut a = sample_row("N/A");
        a.bedrooms = "N/A".into();
        upsert_listing(&path, &a).unwrap();
        let mut b = sample_row("https://kijiji.ca/b");
        b.bedrooms = "N/A".into();
        b.address = "N/A".into();
        upsert_listing(&path, &b).unwrap();

        let s = get_stats(&connect(&path).unwrap()).unwrap();
        assert_eq!(s.total, 2);
        assert_eq!(s.unkeyed, 1);
        let get = |c: &str| s.missing.iter().find(|(n, _)| *n == c).unwrap().1;
        assert_eq!(get("bedrooms"), 2);
        assert_eq!(get("address"), 1);
        assert_eq!(get("title"), 0);
    }
}

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::db::ListingRow;

/// One line of the flat export. Column names and order follow the
/// spreadsheet the single-page run has always produced.
#[derive(Serialize)]
struct CsvRecord<'a> {
    title: &'a str,
    price: &'a str,
    region: &'a str,
    #[serde(rename = "nearest intersection")]
    nearest_intersection: &'a str,
    link: &'a str,
    bedrooms: &'a str,
    bathrooms: &'a str,
    #[serde(rename = "unit type")]
    unit_type: &'a str,
    #[serde(rename = "parking included")]
    parking_included: &'a str,
    #[serde(rename = "size (sqft)")]
    size_sqft: &'a str,
    pets_friendly: &'a str,
    address: &'a str,
    description: &'a str,
}

impl<'a> From<&'a ListingRow> for CsvRecord<'a> {
    fn from(r: &'a ListingRow) -> Self {
        CsvRecord {
            title: &r.title,
            price: &r.price,
            region: &r.region,
            nearest_intersection: &r.nearest_intersection,
            link: &r.url,
            bedrooms: &r.bedrooms,
            bathrooms: &r.bathrooms,
            unit_type: &r.unit_type,
            parking_included: &r.parking_included,
            size_sqft: &r.size_sqft,
            pets_friendly: &r.pets_friendly,
            address: &r.address,
            description: &r.description,
        }
    }
}

/// Write every row as-is; no keying, no de-duplication.
pub fn write_csv<W: Write>(writer: W, rows: &[ListingRow]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    for row in rows {
        w.serialize(CsvRecord::from(row))?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_csv_file(path: impl AsRef<Path>, rows: &[ListingRow]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, rows)
}

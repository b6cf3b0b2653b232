pub mod card;
pub mod detail;

use scraper::ElementRef;

use crate::db::ListingRow;
use card::CardFields;
use detail::Detail;

/// Placeholder stored for anything the source markup did not contain.
pub const NOT_AVAILABLE: &str = "N/A";

/// Outcome of looking up one field in a document fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Found(String),
    Missing,
}

impl Extracted {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Extracted::Found(v) => Some(v),
            Extracted::Missing => None,
        }
    }

    /// Sentinel rendering used at the storage/export boundary.
    pub fn render(self) -> String {
        match self {
            Extracted::Found(v) => v,
            Extracted::Missing => NOT_AVAILABLE.to_string(),
        }
    }
}

impl From<Option<String>> for Extracted {
    fn from(value: Option<String>) -> Self {
        value.map_or(Extracted::Missing, Extracted::Found)
    }
}

/// Merge card fields with the detail-page fields into one storable record.
pub fn assemble(card: CardFields, detail: Detail) -> ListingRow {
    ListingRow {
        url: card.permalink.render(),
        title: card.title.render(),
        price: card.price.render(),
        region: card.region.render(),
        nearest_intersection: card.nearest_intersection.render(),
        bedrooms: card.bedrooms.render(),
        bathrooms: card.bathrooms.render(),
        unit_type: card.unit_type.render(),
        parking_included: card.parking_included.render(),
        size_sqft: card.size_sqft.render(),
        pets_friendly: card.pets_friendly.render(),
        address: detail.address.render(),
        description: detail.description.render(),
    }
}

/// Text of every descendant text node, each trimmed, joined without separator.
pub(crate) fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_renders_sentinel() {
        assert_eq!(Extracted::Missing.render(), "N/A");
        assert_eq!(Extracted::Found(String::new()).render(), "");
    }

    #[test]
    fn from_option() {
        assert_eq!(Extracted::from(Some("x".to_string())), Extracted::Found("x".into()));
        assert_eq!(Extracted::from(None), Extracted::Missing);
    }

    #[test]
    fn stripped_text_joins_trimmed_nodes() {
        let html = scraper::Html::parse_fragment("<p> a <b> b </b>\n c </p>");
        let sel = scraper::Selector::parse("p").unwrap();
        let p = html.select(&sel).next().unwrap();
        assert_eq!(stripped_text(p), "abc");
    }

    #[test]
    fn assemble_renders_missing_detail() {
        let html = std::fs::read_to_string("tests/fixtures/index_page.html").unwrap();
        let card = card::extract_cards(&html, "https://kijiji.ca/").remove(0);
        let row = assemble(card, Detail::missing());
        assert_eq!(row.address, "N/A");
        assert_eq!(row.description, "N/A");
        assert!(row.url.starts_with("https://kijiji.ca/"));
    }
}

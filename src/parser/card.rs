use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use super::{stripped_text, Extracted};

/// Fields read directly off one listing card on an index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub title: Extracted,
    pub permalink: Extracted,
    pub price: Extracted,
    pub region: Extracted,
    pub nearest_intersection: Extracted,
    pub bedrooms: Extracted,
    pub bathrooms: Extracted,
    pub unit_type: Extracted,
    pub parking_included: Extracted,
    pub size_sqft: Extracted,
    pub pets_friendly: Extracted,
}

struct CardSelectors {
    card: Selector,
    title: Selector,
    price: Selector,
    region: Selector,
    nearest_intersection: Selector,
    bedrooms: Selector,
    bathrooms: Selector,
    unit_type: Selector,
    parking_included: Selector,
    size_sqft: Selector,
    pets_friendly: Selector,
}

fn selectors() -> &'static CardSelectors {
    static SEL: OnceLock<CardSelectors> = OnceLock::new();
    SEL.get_or_init(|| {
        let css = |s: &str| Selector::parse(s).unwrap();
        let attr = |label: &str| css(&format!(r#"li[aria-label="{label}"]"#));
        CardSelectors {
            card: css(r#"section[data-testid="listing-card"]"#),
            title: css(r#"a[data-testid="listing-link"]"#),
            price: css(r#"p[data-testid="listing-price"]"#),
            region: css(r#"p[data-testid="listing-location"]"#),
            nearest_intersection: attr("Nearest intersection"),
            bedrooms: attr("Bedrooms"),
            bathrooms: attr("Bathrooms"),
            unit_type: attr("Unit type"),
            parking_included: attr("Parking included"),
            size_sqft: attr("Size (sqft)"),
            pets_friendly: attr("Pets friendly"),
        }
    })
}

/// Parse an index page and extract every listing card, in document order.
pub fn extract_cards(html: &str, link_base: &str) -> Vec<CardFields> {
    let doc = Html::parse_document(html);
    doc.select(&selectors().card)
        .map(|card| extract_card(card, link_base))
        .collect()
}

pub fn extract_card(card: ElementRef<'_>, link_base: &str) -> CardFields {
    let sel = selectors();
    let first = |s: &Selector| -> Extracted { card.select(s).next().map(stripped_text).into() };

    // Permalink = link_base + href. An anchor without href still yields a title.
    let anchor = card.select(&sel.title).next();
    let title = anchor.map(stripped_text).into();
    let permalink = anchor
        .and_then(|a| a.value().attr("href"))
        .map(|href| format!("{link_base}{href}"))
        .into();

    CardFields {
        title,
        permalink,
        price: first(&sel.price),
        region: first(&sel.region),
        nearest_intersection: first(&sel.nearest_intersection),
        bedrooms: first(&sel.bedrooms),
        bathrooms: first(&sel.bathrooms),
        unit_type: first(&sel.unit_type),
        parking_included: first(&sel.parking_included),
        size_sqft: first(&sel.size_sqft),
        pets_friendly: first(&sel.pets_friendly),
    }
}

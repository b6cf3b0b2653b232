use std::sync::OnceLock;

use scraper::{Html, Selector};

use super::{stripped_text, Extracted};

/// Supplementary fields read from a listing's own page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub address: Extracted,
    pub description: Extracted,
}

impl Detail {
    /// Result used when the page could not be fetched at all.
    pub fn missing() -> Self {
        Detail {
            address: Extracted::Missing,
            description: Extracted::Missing,
        }
    }
}

fn address_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse(r#"span[itemprop="address"]"#).unwrap())
}

fn paragraph_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("div > p").unwrap())
}

/// Address from the marked span; description is every `div > p` in document
/// order, concatenated with no separator. A page with no paragraphs yields
/// an empty (but found) description.
pub fn parse_detail(html: &str) -> Detail {
    let doc = Html::parse_document(html);
    let address = doc
        .select(address_selector())
        .next()
        .map(stripped_text)
        .into();
    let description = doc
        .select(paragraph_selector())
        .map(stripped_text)
        .collect::<String>();

    Detail {
        address,
        description: Extracted::Found(description),
    }
}

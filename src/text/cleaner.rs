use std::borrow::Cow;

use regex::Regex;

use super::tables::{Lookup, LookupTables};
use super::tokenizer::Tokenizer;

/// ASCII punctuation minus the apostrophe, which contractions still need.
const STRIPPED_PUNCTUATION: &str = r##"!"#$%&()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Fixed-order normalization pipeline:
/// lowercase → trim → html → urls → punctuation → emoji → acronyms → contractions.
///
/// Expansion is a single pass per table; an expansion that itself contains a
/// table key is not expanded again.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    tokenizer: Tokenizer,
    tables: LookupTables,
    html: Regex,
    urls: Regex,
    emoji: Regex,
}

impl TextCleaner {
    pub fn new(tables: LookupTables) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            tables,
            html: Regex::new(r"<.*?>").unwrap(),
            urls: Regex::new(r"https?://\S+|www\.\S+").unwrap(),
            emoji: Regex::new(concat!(
                "[",
                r"\x{1F600}-\x{1F64F}", // emoticons
                r"\x{1F300}-\x{1F5FF}", // symbols & pictographs
                r"\x{1F680}-\x{1F6FF}", // transport & map
                r"\x{1F1E0}-\x{1F1FF}", // flags
                r"\x{2702}-\x{27B0}",
                r"\x{24C2}-\x{1F251}",
                "]+",
            ))
            .unwrap(),
        }
    }

    pub fn clean(&self, text: &str) -> String {
        let text = self.strip(text);
        let text = self.expand_acronyms(&text);
        self.expand_contractions(&text)
    }

    /// Every stage before expansion.
    pub fn strip(&self, text: &str) -> String {
        let text = text.to_lowercase();
        let text = text.trim();
        let text = self.remove_html(text);
        let text = self.remove_urls(&text);
        let text = remove_punctuation(&text);
        self.remove_emoji(&text).into_owned()
    }

    pub fn remove_html<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.html.replace_all(text, "")
    }

    pub fn remove_urls<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.urls.replace_all(text, "")
    }

    pub fn remove_emoji<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.emoji.replace_all(text, "")
    }

    pub fn expand_acronyms(&self, text: &str) -> String {
        self.expand(text, &self.tables.acronyms)
    }

    pub fn expand_contractions(&self, text: &str) -> String {
        self.expand(text, &self.tables.contractions)
    }

    /// Tokenize, swap each token found in `table` for its words, rejoin with
    /// single spaces. Anything the tokenizer skips is dropped.
    fn expand(&self, text: &str, table: &Lookup) -> String {
        let mut words: Vec<&str> = Vec::new();
        for token in self.tokenizer.tokens(text) {
            match table.get(token) {
                Some(expansion) => words.extend(expansion.split_whitespace()),
                None => words.push(token),
            }
        }
        words.join(" ")
    }
}

pub fn remove_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(*c))
        .collect()
}

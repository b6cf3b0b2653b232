use regex::Regex;

/// Splits text into runs of word characters and apostrophes.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    re: Regex,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            re: Regex::new(r"[\w']+").unwrap(),
        }
    }

    pub fn tokens<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.re.find_iter(text).map(|m| m.as_str()).collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

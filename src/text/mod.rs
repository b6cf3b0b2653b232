pub mod cleaner;
pub mod tables;
pub mod tokenizer;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

pub use cleaner::TextCleaner;
pub use tables::LookupTables;

/// Clean many lines in parallel, keeping input order.
pub fn clean_lines(cleaner: &TextCleaner, lines: &[String]) -> Vec<String> {
    let pb = ProgressBar::new(lines.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut out = Vec::with_capacity(lines.len());
    for chunk in lines.chunks(500) {
        out.par_extend(chunk.par_iter().map(|l| cleaner.clean(l)));
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_preserved() {
        let tables = LookupTables::from_json(r#"{"brb": "be right back"}"#, "{}").unwrap();
        let cleaner = TextCleaner::new(tables);
        let lines: Vec<String> = (0..1200).map(|i| format!("Line {i}, BRB!")).collect();

        let out = clean_lines(&cleaner, &lines);
        assert_eq!(out.len(), 1200);
        assert_eq!(out[0], "line 0 be right back");
        assert_eq!(out[1199], "line 1199 be right back");
    }
}

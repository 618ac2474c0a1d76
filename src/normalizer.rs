use crate::model::ProductRecord;

/// Joins every non-empty review into one lowercase blob, space separated.
pub fn review_corpus(records: &[ProductRecord]) -> String {
    records
        .iter()
        .filter_map(|r| r.review.as_deref())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Splits text into lowercase alphabetic words.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_review(text: Option<&str>) -> ProductRecord {
        ProductRecord {
            review: text.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn corpus_skips_empty_and_lowercases() {
        let records = vec![
            with_review(Some("Ótimo produto")),
            with_review(None),
            with_review(Some("   ")),
            with_review(Some("Veio PEQUENO")),
        ];
        assert_eq!(review_corpus(&records), "ótimo produto veio pequeno");
    }

    #[test]
    fn tokenize_splits_on_punctuation() {
        let words: Vec<String> = tokenize("Confortável, bonito!! 10/10 recomendo").collect();
        assert_eq!(words, vec!["confortável", "bonito", "recomendo"]);
    }
}

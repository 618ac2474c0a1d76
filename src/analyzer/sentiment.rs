pub const POSITIVE_KEYWORDS: [&str; 13] = [
    "bom", "boa", "excelente", "ótimo", "ótima", "perfeito", "perfeita", "confortável",
    "qualidade", "recomendo", "amei", "adorei", "maravilhos",
];

pub const NEGATIVE_KEYWORDS: [&str; 12] = [
    "ruim", "péssimo", "péssima", "horrível", "pequeno", "pequena", "apertado", "rasgou",
    "desbotou", "falsificação", "falso", "problema",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub positive_terms: Vec<(&'static str, usize)>,
    pub negative_terms: Vec<(&'static str, usize)>,
}

impl SentimentSummary {
    /// Percentage of positive hits; `None` when no keyword matched at all.
    pub fn positive_share(&self) -> Option<f64> {
        let total = self.positive + self.negative;
        (total > 0).then(|| self.positive as f64 / total as f64 * 100.0)
    }

    /// Negative keywords with at least one hit, most frequent first.
    pub fn top_complaints(&self, limit: usize) -> Vec<(&'static str, usize)> {
        let mut hits: Vec<(&'static str, usize)> = self
            .negative_terms
            .iter()
            .copied()
            .filter(|(_, n)| *n > 0)
            .collect();
        hits.sort_by(|a, b| b.1.cmp(&a.1));
        hits.truncate(limit);
        hits
    }
}

/// Counts keyword hits in a lowercase corpus. Matching is by substring,
/// so "pequeno" also matches inside "pequenos".
pub fn count_sentiment(corpus: &str) -> SentimentSummary {
    let count_terms = |terms: &[&'static str]| -> Vec<(&'static str, usize)> {
        terms
            .iter()
            .map(|&term| (term, corpus.matches(term).count()))
            .collect()
    };
    let positive_terms = count_terms(&POSITIVE_KEYWORDS);
    let negative_terms = count_terms(&NEGATIVE_KEYWORDS);

    SentimentSummary {
        positive: positive_terms.iter().map(|(_, n)| n).sum(),
        negative: negative_terms.iter().map(|(_, n)| n).sum(),
        positive_terms,
        negative_terms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_substrings_not_words() {
        let summary = count_sentiment("muito bom, bombom! veio pequenos e apertado");
        // "bom" appears three times, twice inside "bombom"
        assert_eq!(summary.positive, 3);
        assert_eq!(summary.negative, 2);
    }

    #[test]
    fn inflected_words_still_match() {
        // "ótimo" matches inside "ótimos"
        let summary = count_sentiment("ótimos produtos, péssimo atendimento");
        assert_eq!(summary.positive, 1);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.positive_share(), Some(50.0));
    }

    #[test]
    fn share_is_none_without_hits() {
        let summary = count_sentiment("chegou no prazo");
        assert_eq!(summary.positive, 0);
        assert_eq!(summary.negative, 0);
        assert_eq!(summary.positive_share(), None);
    }

    #[test]
    fn share_within_bounds() {
        let summary = count_sentiment("excelente qualidade, recomendo. ruim");
        let share = summary.positive_share().unwrap();
        assert!((0.0..=100.0).contains(&share));
        assert!((share - 75.0).abs() < 1e-9);
    }

    #[test]
    fn top_complaints_sorted() {
        let summary = count_sentiment("pequeno pequeno rasgou pequeno desbotou rasgou");
        assert_eq!(
            summary.top_complaints(2),
            vec![("pequeno", 3), ("rasgou", 2)]
        );
    }
}

// Best-effort word cloud of the review corpus
use crate::normalizer::tokenize;
use crate::report::charts::viridis;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const WORDCLOUD_FILE: &str = "10_wordcloud_reviews.png";
const CANVAS: (u32, u32) = (1200, 600);
const MAX_FONT: f64 = 110.0;
const MIN_FONT: f64 = 12.0;

const STOPWORDS: &[&str] = &[
    "que", "não", "nao", "com", "para", "por", "uma", "uns", "umas", "mas", "mais", "muito",
    "muita", "bem", "foi", "era", "são", "tem", "ter", "seu", "sua", "meu", "minha", "dos",
    "das", "nos", "nas", "pelo", "pela", "como", "ele", "ela", "eles", "elas", "isso", "esse",
    "essa", "este", "esta", "até", "já", "também", "quando", "ainda", "só", "sem", "pois",
    "estou", "está", "the", "and", "for",
];

/// Result of the word cloud step: either written or skipped with a reason.
#[derive(Debug, Clone, PartialEq)]
pub enum WordCloudOutcome {
    Rendered(PathBuf),
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub font_size: f64,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PlacedWord {
    fn overlaps(&self, x: i32, y: i32, w: u32, h: u32) -> bool {
        x < self.x + self.width as i32
            && self.x < x + w as i32
            && y < self.y + self.height as i32
            && self.y < y + h as i32
    }
}

/// Most frequent words (at least three letters, stop-words removed),
/// ties broken alphabetically.
pub fn word_frequencies(corpus: &str, max_words: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in tokenize(corpus) {
        if word.chars().count() < 3 || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        *counts.entry(word).or_default() += 1;
    }
    let mut words: Vec<(String, usize)> = counts.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(max_words);
    words
}

/// Places words on an archimedean spiral starting at a random point near
/// the centre. `measure` returns the pixel box of a word at a font size.
/// Words that cannot be placed without overlap are dropped.
pub fn layout<M>(
    words: &[(String, usize)],
    canvas: (u32, u32),
    seed: u64,
    measure: M,
) -> Vec<PlacedWord>
where
    M: Fn(&str, f64) -> Option<(u32, u32)>,
{
    let Some(top) = words.first().map(|w| w.1 as f64) else {
        return Vec::new();
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let (cw, ch) = (canvas.0 as i32, canvas.1 as i32);
    let mut placed: Vec<PlacedWord> = Vec::new();

    for (word, count) in words {
        let font_size = (MAX_FONT * *count as f64 / top).max(MIN_FONT);
        let Some((w, h)) = measure(word, font_size) else {
            continue;
        };
        if w as i32 > cw || h as i32 > ch {
            continue;
        }

        let start_x = cw / 2 + rng.random_range(-cw / 10..=cw / 10);
        let start_y = ch / 2 + rng.random_range(-ch / 10..=ch / 10);
        let mut angle: f64 = 0.0;
        let spot = loop {
            let radius = 2.0 * angle;
            if radius > (cw.max(ch)) as f64 {
                break None;
            }
            let x = start_x + (radius * angle.cos()) as i32 - w as i32 / 2;
            let y = start_y + (radius * angle.sin()) as i32 - h as i32 / 2;
            let inside = x >= 0 && y >= 0 && x + w as i32 <= cw && y + h as i32 <= ch;
            if inside && !placed.iter().any(|p| p.overlaps(x, y, w, h)) {
                break Some((x, y));
            }
            angle += 0.1;
        };

        if let Some((x, y)) = spot {
            placed.push(PlacedWord {
                word: word.clone(),
                font_size,
                x,
                y,
                width: w,
                height: h,
            });
        }
    }
    placed
}

/// Renders the word cloud. Never fails the run: every problem becomes
/// `WordCloudOutcome::Skipped`.
pub fn render_wordcloud(corpus: &str, dir: &Path, max_words: usize, seed: u64) -> WordCloudOutcome {
    let words = word_frequencies(corpus, max_words);
    if words.is_empty() {
        return WordCloudOutcome::Skipped {
            reason: "no words left after filtering the reviews".into(),
        };
    }
    let path = dir.join(WORDCLOUD_FILE);
    let drawn = draw(&words, &path, seed);
    settle(path, drawn)
}

/// Maps the drawing result to an outcome. The backend flushes the image
/// when dropped, so a skipped cloud must not leave that file behind.
fn settle(path: PathBuf, drawn: Result<usize, Box<dyn std::error::Error>>) -> WordCloudOutcome {
    let reason = match drawn {
        Ok(0) => "no word could be laid out".to_string(),
        Ok(_) => return WordCloudOutcome::Rendered(path),
        Err(e) => e.to_string(),
    };
    if let Err(e) = fs::remove_file(&path) {
        if e.kind() != ErrorKind::NotFound {
            warn!("Could not remove partial word cloud {}: {}", path.display(), e);
        }
    }
    WordCloudOutcome::Skipped { reason }
}

fn draw(words: &[(String, usize)], path: &Path, seed: u64) -> Result<usize, Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, CANVAS).into_drawing_area();
    root.fill(&WHITE)?;

    // probe once so a missing font is reported instead of silently dropping every word
    root.estimate_text_size("Ag", &("sans-serif", MIN_FONT).into_font().into())?;

    let placed = layout(words, CANVAS, seed, |word, size| {
        root.estimate_text_size(word, &("sans-serif", size).into_font().into()).ok()
    });

    let top = placed.first().map(|p| p.font_size).unwrap_or(MAX_FONT);
    for p in &placed {
        let color = viridis(1.0 - p.font_size / top * 0.85);
        let style = ("sans-serif", p.font_size).into_font().color(&color);
        root.draw(&Text::new(p.word.as_str(), (p.x, p.y), style))?;
    }
    root.present()?;
    Ok(placed.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_measure(word: &str, size: f64) -> Option<(u32, u32)> {
        Some(((word.chars().count() as f64 * size * 0.6) as u32, size as u32))
    }

    #[test]
    fn frequencies_filter_short_and_stop_words() {
        let words = word_frequencies("muito bom, bom demais! o tênis é bom e confortável, confortável", 10);
        assert_eq!(words[0], ("bom".to_string(), 3));
        assert_eq!(words[1], ("confortável".to_string(), 2));
        assert!(words.iter().all(|(w, _)| w != "muito" && w != "o" && w != "é"));
    }

    #[test]
    fn frequencies_respect_limit() {
        let words = word_frequencies("alfa beta gama delta alfa beta alfa", 2);
        assert_eq!(words, vec![("alfa".to_string(), 3), ("beta".to_string(), 2)]);
    }

    #[test]
    fn layout_is_deterministic_and_non_overlapping() {
        let words = word_frequencies(
            "qualidade qualidade qualidade entrega rápida rápida tamanho pequeno pequeno confortável bonito",
            50,
        );
        let first = layout(&words, (1200, 600), 42, approx_measure);
        let second = layout(&words, (1200, 600), 42, approx_measure);
        assert_eq!(first, second);
        assert_eq!(first.len(), words.len());

        for (i, a) in first.iter().enumerate() {
            assert!(a.x >= 0 && a.y >= 0);
            assert!(a.x + a.width as i32 <= 1200 && a.y + a.height as i32 <= 600);
            for b in &first[i + 1..] {
                assert!(!a.overlaps(b.x, b.y, b.width, b.height), "{} overlaps {}", a.word, b.word);
            }
        }
    }

    #[test]
    fn oversized_words_are_dropped() {
        let words = vec![("enorme".to_string(), 1)];
        let placed = layout(&words, (100, 50), 1, |_, _| Some((500, 80)));
        assert!(placed.is_empty());
    }

    #[test]
    fn unplaced_cloud_leaves_no_file() {
        let path = std::env::temp_dir().join(format!("wordcloud_unplaced_{}.png", std::process::id()));
        fs::write(&path, b"blank").unwrap();

        let outcome = settle(path.clone(), Ok(0));
        assert!(matches!(outcome, WordCloudOutcome::Skipped { .. }));
        assert!(!path.exists());

        // nothing written at all is not an error either
        assert!(matches!(settle(path.clone(), Err("font missing".into())), WordCloudOutcome::Skipped { .. }));
    }

    #[test]
    fn placed_words_keep_the_file() {
        let path = std::env::temp_dir().join(WORDCLOUD_FILE);
        assert_eq!(settle(path.clone(), Ok(3)), WordCloudOutcome::Rendered(path));
    }

    #[test]
    fn empty_corpus_is_skipped() {
        let outcome = render_wordcloud("  ", Path::new("."), 100, 42);
        assert!(matches!(outcome, WordCloudOutcome::Skipped { .. }));
    }
}

// Report module: charts on disk, insights on stdout.

pub mod charts;
pub mod insights;
pub mod wordcloud;

use crate::config::AppConfig;
use crate::model::ReportError;
use charts::ChartCanvas;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wordcloud::{WordCloudOutcome, render_wordcloud};

pub struct Reporter {
    pub canvas: ChartCanvas,
    wordcloud_max_words: usize,
    wordcloud_seed: u64,
}

impl Reporter {
    /// Prepares the output directory charts are written to.
    pub fn new(config: &AppConfig) -> Result<Self, ReportError> {
        fs::create_dir_all(&config.output_dir).map_err(|source| ReportError::OutputDir {
            path: config.output_dir.clone(),
            source,
        })?;
        Ok(Self {
            canvas: ChartCanvas::new(&config.output_dir, (config.chart_width, config.chart_height)),
            wordcloud_max_words: config.wordcloud_max_words,
            wordcloud_seed: config.wordcloud_seed,
        })
    }

    pub fn line(&self, line: impl AsRef<str>) {
        println!("{}", line.as_ref());
    }

    pub fn print(&self, lines: impl IntoIterator<Item = String>) {
        for line in lines {
            self.line(line);
        }
    }

    /// Prints the "saved" line for the given chart files.
    pub fn saved(&self, paths: &[PathBuf]) {
        for path in paths {
            info!("Chart written: {}", path.display());
        }
        let names: Vec<&str> = paths.iter().map(|p| file_name(p)).collect();
        self.line(insights::saved(&names));
    }

    /// Best-effort word cloud: a failure is logged and reported, never raised.
    pub fn wordcloud(&self, corpus: &str) -> WordCloudOutcome {
        let outcome = render_wordcloud(corpus, &self.canvas.dir, self.wordcloud_max_words, self.wordcloud_seed);
        if let WordCloudOutcome::Skipped { reason } = &outcome {
            warn!("Word cloud skipped: {}", reason);
        }
        outcome
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

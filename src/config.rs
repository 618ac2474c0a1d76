use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dataset_path: String,
    pub output_dir: String,
    pub chart_width: u32,
    pub chart_height: u32,
    pub top_brands: usize,
    pub top_materials: usize,
    pub boxplot_materials: usize,
    pub price_bins: usize,
    pub histogram_bins: usize,
    pub satisfaction_threshold: f64,
    pub wordcloud_max_words: usize,
    pub wordcloud_seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: "ecommerce_limpo.csv".into(),
            output_dir: ".".into(),
            chart_width: 1600,
            chart_height: 900,
            top_brands: 10,
            top_materials: 10,
            boxplot_materials: 8,
            price_bins: 10,
            histogram_bins: 50,
            satisfaction_threshold: 4.5,
            wordcloud_max_words: 100,
            wordcloud_seed: 42,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads the config file; a missing file yields the defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(e.into()),
    };
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config("no/such/config.json").unwrap();
        assert_eq!(config.dataset_path, "ecommerce_limpo.csv");
        assert_eq!(config.price_bins, 10);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "dataset_path": "vendas.csv", "top_brands": 5 }"#).unwrap();
        assert_eq!(config.dataset_path, "vendas.csv");
        assert_eq!(config.top_brands, 5);
        assert_eq!(config.histogram_bins, 50);
        assert!((config.satisfaction_threshold - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = serde_json::from_str::<AppConfig>(r#"{ "top_brands": "ten" }"#);
        assert!(err.is_err());
    }
}

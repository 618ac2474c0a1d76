// Core structs: ProductRecord, Dataset, aggregate rows, errors
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// One listing of the cleaned dataset. Every cell may be empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Marca", default)]
    pub brand: Option<String>,
    #[serde(rename = "Material", default)]
    pub material: Option<String>,
    #[serde(rename = "Temporada", default)]
    pub season: Option<String>,
    #[serde(rename = "Preço", default)]
    pub price: Option<f64>,
    #[serde(rename = "Nota", default)]
    pub rating: Option<f64>,
    #[serde(rename = "N_Avaliações", default)]
    pub rating_count: Option<f64>,
    #[serde(rename = "Desconto", default)]
    pub discount: Option<f64>,
    #[serde(rename = "Qtd_Vendidos_Numeric", default)]
    pub quantity_sold: Option<f64>,
    #[serde(rename = "Receita_Estimada", default)]
    pub revenue: Option<f64>,
    #[serde(rename = "Preço_Final", default)]
    pub final_price: Option<f64>,
    #[serde(rename = "Review1", default)]
    pub review: Option<String>,
}

impl ProductRecord {
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Price => self.price,
            Column::Rating => self.rating,
            Column::RatingCount => self.rating_count,
            Column::Discount => self.discount,
            Column::QuantitySold => self.quantity_sold,
            Column::Revenue => self.revenue,
            Column::FinalPrice => self.final_price,
            Column::Brand | Column::Material | Column::Season | Column::Review => None,
        }
    }

    pub fn key(&self, dimension: Dimension) -> Option<&str> {
        let raw = match dimension {
            Dimension::Brand => self.brand.as_deref(),
            Dimension::Material => self.material.as_deref(),
            Dimension::Season => self.season.as_deref(),
        };
        raw.map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Columns the analyses know about, with their CSV header names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Brand,
    Material,
    Season,
    Price,
    Rating,
    RatingCount,
    Discount,
    QuantitySold,
    Revenue,
    FinalPrice,
    Review,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Brand,
        Column::Material,
        Column::Season,
        Column::Price,
        Column::Rating,
        Column::RatingCount,
        Column::Discount,
        Column::QuantitySold,
        Column::Revenue,
        Column::FinalPrice,
        Column::Review,
    ];

    /// Numeric columns considered by the correlation matrix, in display order.
    pub const NUMERIC: [Column; 7] = [
        Column::Rating,
        Column::RatingCount,
        Column::Discount,
        Column::Price,
        Column::QuantitySold,
        Column::Revenue,
        Column::FinalPrice,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Brand => "Marca",
            Column::Material => "Material",
            Column::Season => "Temporada",
            Column::Price => "Preço",
            Column::Rating => "Nota",
            Column::RatingCount => "N_Avaliações",
            Column::Discount => "Desconto",
            Column::QuantitySold => "Qtd_Vendidos_Numeric",
            Column::Revenue => "Receita_Estimada",
            Column::FinalPrice => "Preço_Final",
            Column::Review => "Review1",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header.trim())
    }
}

/// Categorical attributes records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Brand,
    Material,
    Season,
}

/// The loaded table: immutable for the rest of the run.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<ProductRecord>,
    pub columns: HashSet<Column>,
}

impl Dataset {
    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn has_all(&self, columns: &[Column]) -> bool {
        columns.iter().all(|c| self.has(*c))
    }

    /// Columns from `required` that the header row did not contain.
    pub fn missing(&self, required: &[Column]) -> Vec<&'static str> {
        required
            .iter()
            .filter(|c| !self.has(**c))
            .map(|c| c.header())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Present values of a numeric column, in row order.
    pub fn values(&self, column: Column) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.value(column)).collect()
    }
}

/// Summed/averaged metrics of one group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub revenue: f64,
    pub quantity: f64,
    pub mean_price: Option<f64>,
    pub mean_rating: Option<f64>,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read dataset '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset at line {line}: {message}")]
    Malformed { line: u64, message: String },
    #[error("dataset has a header but no rows")]
    Empty,
}

#[derive(Debug, Error, PartialEq)]
pub enum DegenerateInputError {
    #[error("no records carry the values required by {0}")]
    NoObservations(&'static str),
    #[error("total {0} is zero, shares are undefined")]
    ZeroTotal(&'static str),
}

#[derive(Debug, Error)]
#[error("failed to render chart '{file}': {message}")]
pub struct ChartError {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error("cannot prepare output directory '{path}': {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_round_trips_known_columns() {
        for column in Column::ALL {
            assert_eq!(Column::from_header(column.header()), Some(column));
        }
        assert_eq!(Column::from_header("Título"), None);
    }

    #[test]
    fn blank_keys_are_treated_as_missing() {
        let record = ProductRecord {
            brand: Some("  ".into()),
            material: Some(" Couro ".into()),
            ..Default::default()
        };
        assert_eq!(record.key(Dimension::Brand), None);
        assert_eq!(record.key(Dimension::Material), Some("Couro"));
        assert_eq!(record.key(Dimension::Season), None);
    }

    #[test]
    fn missing_lists_absent_headers() {
        let dataset = Dataset {
            records: vec![],
            columns: [Column::Brand, Column::Revenue].into_iter().collect(),
        };
        assert!(dataset.has_all(&[Column::Brand, Column::Revenue]));
        assert_eq!(dataset.missing(&[Column::Brand, Column::Rating]), vec!["Nota"]);
    }
}

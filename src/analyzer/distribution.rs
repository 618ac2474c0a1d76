use crate::model::{Column, Dataset};
use crate::utils::{mean, median};

/// Pearson correlation coefficient between two equally long slices.
/// Returns None if slices have different lengths, fewer than two points,
/// or either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let numerator: f64 = x.iter().zip(y.iter()).map(|(xi, yi)| (xi - mean_x) * (yi - mean_y)).sum();
    let denominator_x: f64 = x.iter().map(|xi| (xi - mean_x).powi(2)).sum();
    let denominator_y: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();
    let denominator = (denominator_x * denominator_y).sqrt();
    if denominator == 0.0 {
        None
    } else {
        Some((numerator / denominator).clamp(-1.0, 1.0))
    }
}

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    /// Row-major, `cells[i][j]` correlates `columns[i]` with `columns[j]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        self.cells[i][j]
    }

    /// Distinct column pairs with |r| above `threshold`, strongest first.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<(Column, Column, f64)> {
        let mut pairs = Vec::new();
        for i in 0..self.columns.len() {
            for j in (i + 1)..self.columns.len() {
                if let Some(r) = self.cells[i][j] {
                    if r.abs() > threshold {
                        pairs.push((self.columns[i], self.columns[j], r));
                    }
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs
    }
}

/// Pairwise Pearson correlation over the numeric columns present in the
/// dataset. Each pair uses the rows where both values exist.
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    let columns: Vec<Column> = Column::NUMERIC
        .iter()
        .copied()
        .filter(|c| dataset.has(*c))
        .collect();

    let cells = columns
        .iter()
        .map(|&a| {
            columns
                .iter()
                .map(|&b| {
                    let (x, y): (Vec<f64>, Vec<f64>) = dataset
                        .records
                        .iter()
                        .filter_map(|r| Some((r.value(a)?, r.value(b)?)))
                        .unzip();
                    pearson(&x, &y)
                })
                .collect()
        })
        .collect();

    CorrelationMatrix { columns, cells }
}

#[derive(Debug, Clone)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Equal-width histogram over [min, max]; the last bin is closed.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    let bins = bins.max(1);
    let (lo, hi) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    Some(Histogram { edges, counts })
}

/// Gaussian kernel density estimate with Scott's bandwidth, sampled at
/// `points` positions over [min - range/2, max + range/2].
pub fn kde(values: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    if values.len() < 2 || points < 2 {
        return None;
    }
    let n = values.len() as f64;
    let avg = values.iter().sum::<f64>() / n;
    let std_dev = (values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    if std_dev == 0.0 {
        return None;
    }
    let bandwidth = std_dev * n.powf(-1.0 / 5.0);

    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    let range = max - min;
    let start = min - range / 2.0;
    let step = (2.0 * range) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let curve = (0..points)
        .map(|i| {
            let x = start + step * i as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            (x, density * norm)
        })
        .collect();
    Some(curve)
}

/// Headline numbers of the executive summary. Each is `None` when its
/// column is absent or empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_revenue: Option<f64>,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub mean_rating: Option<f64>,
    /// Percentage of all records rated at or above the threshold.
    pub satisfaction_rate: Option<f64>,
}

pub fn summary_stats(dataset: &Dataset, satisfaction_threshold: f64) -> SummaryStats {
    let revenue = dataset.values(Column::Revenue);
    let prices = dataset.values(Column::Price);
    let ratings = dataset.values(Column::Rating);

    SummaryStats {
        total_revenue: dataset
            .has(Column::Revenue)
            .then(|| revenue.iter().sum()),
        mean_price: mean(&prices),
        median_price: median(&prices),
        mean_rating: mean(&ratings),
        satisfaction_rate: (dataset.has(Column::Rating) && !dataset.records.is_empty()).then(|| {
            let satisfied = ratings.iter().filter(|r| **r >= satisfaction_threshold).count();
            satisfied as f64 / dataset.len() as f64 * 100.0
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductRecord;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn dataset(records: Vec<ProductRecord>, columns: &[Column]) -> Dataset {
        Dataset {
            records,
            columns: columns.iter().copied().collect(),
        }
    }

    #[test]
    fn pearson_of_linear_data() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 1.0).collect();
        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &neg).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    #[test]
    fn matrix_uses_present_columns_and_pairwise_rows() {
        let records = vec![
            ProductRecord { price: Some(10.0), revenue: Some(100.0), rating: Some(4.0), ..Default::default() },
            ProductRecord { price: Some(20.0), revenue: Some(200.0), rating: None, ..Default::default() },
            ProductRecord { price: Some(30.0), revenue: Some(300.0), rating: Some(3.0), ..Default::default() },
            ProductRecord { price: None, revenue: Some(999.0), rating: Some(5.0), ..Default::default() },
        ];
        let matrix = correlation_matrix(&dataset(records, &[Column::Price, Column::Revenue, Column::Rating]));
        assert_eq!(matrix.columns, vec![Column::Rating, Column::Price, Column::Revenue]);
        assert!((matrix.get(Column::Price, Column::Revenue).unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get(Column::Price, Column::Price).unwrap() - 1.0).abs() < 1e-12);
        assert!((matrix.get(Column::Rating, Column::Price).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(matrix.get(Column::Discount, Column::Price), None);

        let strong = matrix.strong_pairs(0.7);
        assert_eq!(strong.len(), 3);
    }

    #[test]
    fn histogram_counts_every_value() {
        let mut rng = StdRng::seed_from_u64(5);
        let values: Vec<f64> = (0..777).map(|_| rng.random_range(10.0..500.0)).collect();
        let hist = histogram(&values, 50).unwrap();
        assert_eq!(hist.counts.len(), 50);
        assert_eq!(hist.edges.len(), 51);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
        assert!(histogram(&[], 10).is_none());
    }

    #[test]
    fn kde_integrates_to_one() {
        let mut rng = StdRng::seed_from_u64(9);
        let values: Vec<f64> = (0..400).map(|_| rng.random_range(3.0..5.0)).collect();
        let curve = kde(&values, 1000).unwrap();
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        assert!((area - 1.0).abs() < 0.02, "area was {area}");
        assert!(kde(&[4.0, 4.0, 4.0], 100).is_none());
    }

    #[test]
    fn summary_counts_unrated_rows_in_denominator() {
        let records = vec![
            ProductRecord { rating: Some(4.8), price: Some(100.0), revenue: Some(10.0), ..Default::default() },
            ProductRecord { rating: Some(4.5), price: Some(50.0), revenue: Some(20.0), ..Default::default() },
            ProductRecord { rating: Some(3.9), price: Some(30.0), revenue: None, ..Default::default() },
            ProductRecord { rating: None, price: None, revenue: Some(5.0), ..Default::default() },
        ];
        let stats = summary_stats(&dataset(records, &[Column::Rating, Column::Price, Column::Revenue]), 4.5);
        assert_eq!(stats.total_revenue, Some(35.0));
        assert_eq!(stats.mean_price, Some(60.0));
        assert_eq!(stats.median_price, Some(50.0));
        assert_eq!(stats.satisfaction_rate, Some(50.0));
    }

    #[test]
    fn summary_without_columns_is_empty() {
        let stats = summary_stats(&dataset(vec![ProductRecord::default()], &[]), 4.5);
        assert_eq!(stats.total_revenue, None);
        assert_eq!(stats.mean_rating, None);
        assert_eq!(stats.satisfaction_rate, None);
    }
}

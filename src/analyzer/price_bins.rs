use crate::model::{DegenerateInputError, ProductRecord};

/// One equal-width price interval `(lower, upper]` (the first one is
/// closed on the left as well).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBin {
    pub lower: f64,
    pub upper: f64,
    pub quantity: f64,
    pub revenue: f64,
    pub count: usize,
}

impl PriceBin {
    /// Chart label with truncated integer bounds, e.g. `49-98`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower.trunc() as i64, self.upper.trunc() as i64)
    }
}

#[derive(Debug, Clone)]
pub struct PriceBinning {
    pub edges: Vec<f64>,
    pub bins: Vec<PriceBin>,
}

impl PriceBinning {
    /// Bin with the highest revenue; the first one wins ties.
    pub fn sweet_spot(&self) -> Option<&PriceBin> {
        self.bins.iter().fold(None, |best: Option<&PriceBin>, bin| match best {
            Some(b) if b.revenue >= bin.revenue => Some(b),
            _ => Some(bin),
        })
    }

    /// Index of the bin containing `price`, `None` outside the binned range.
    pub fn bin_index(&self, price: f64) -> Option<usize> {
        let first = *self.edges.first()?;
        let last = *self.edges.last()?;
        if !(first..=last).contains(&price) {
            return None;
        }
        self.edges[1..]
            .iter()
            .position(|&upper| price <= upper)
            .or(Some(self.bins.len() - 1))
    }
}

/// Equal-width edges between `min` and `max`. A zero-width range is
/// widened by 0.1% of its magnitude on each side.
pub fn equal_width_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let (lo, hi) = if min == max {
        let pad = if min == 0.0 { 0.001 } else { 0.001 * min.abs() };
        (min - pad, max + pad)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    // pin the ends so floating error never leaves the max outside
    edges[0] = lo;
    edges[bins] = hi;
    edges
}

/// Splits the observed price range into `bins` equal-width bins and sums
/// quantity and revenue per bin.
pub fn bin_prices(records: &[ProductRecord], bins: usize) -> Result<PriceBinning, DegenerateInputError> {
    let prices: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    let (Some(min), Some(max)) = (
        prices.iter().copied().reduce(f64::min),
        prices.iter().copied().reduce(f64::max),
    ) else {
        return Err(DegenerateInputError::NoObservations("price binning"));
    };
    let bins = bins.max(1);

    let edges = equal_width_edges(min, max, bins);
    let mut binning = PriceBinning {
        bins: edges
            .windows(2)
            .map(|w| PriceBin {
                lower: w[0],
                upper: w[1],
                quantity: 0.0,
                revenue: 0.0,
                count: 0,
            })
            .collect(),
        edges,
    };

    for record in records {
        let Some(index) = record.price.and_then(|p| binning.bin_index(p)) else {
            continue;
        };
        let bin = &mut binning.bins[index];
        bin.quantity += record.quantity_sold.unwrap_or(0.0);
        bin.revenue += record.revenue.unwrap_or(0.0);
        bin.count += 1;
    }
    Ok(binning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn record(price: f64, qty: f64, revenue: f64) -> ProductRecord {
        ProductRecord {
            price: Some(price),
            quantity_sold: Some(qty),
            revenue: Some(revenue),
            ..Default::default()
        }
    }

    #[test]
    fn ten_bins_cover_range_without_gaps() {
        let mut rng = StdRng::seed_from_u64(21);
        let records: Vec<ProductRecord> = (0..300)
            .map(|_| record(rng.random_range(19.9..899.0), 1.0, 1.0))
            .collect();
        let binning = bin_prices(&records, 10).unwrap();

        assert_eq!(binning.bins.len(), 10);
        let min = records.iter().filter_map(|r| r.price).reduce(f64::min).unwrap();
        let max = records.iter().filter_map(|r| r.price).reduce(f64::max).unwrap();
        assert_eq!(binning.bins[0].lower, min);
        assert_eq!(binning.bins[9].upper, max);
        for pair in binning.bins.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
        }
        assert_eq!(binning.bins.iter().map(|b| b.count).sum::<usize>(), records.len());
    }

    #[test]
    fn boundaries_are_right_inclusive() {
        let records = vec![
            record(0.0, 1.0, 10.0),
            record(10.0, 2.0, 20.0),
            record(10.5, 3.0, 30.0),
            record(100.0, 4.0, 40.0),
        ];
        let binning = bin_prices(&records, 10).unwrap();
        assert_eq!(binning.bins[0].count, 2);
        assert_eq!(binning.bins[1].count, 1);
        assert_eq!(binning.bins[9].count, 1);
        assert_eq!(binning.bins[0].quantity, 3.0);
        assert_eq!(binning.bin_index(100.0), Some(9));
        assert_eq!(binning.bin_index(100.5), None);
    }

    #[test]
    fn sweet_spot_is_max_revenue_bin() {
        let records = vec![
            record(10.0, 100.0, 1000.0),
            record(55.0, 10.0, 5000.0),
            record(100.0, 1.0, 100.0),
        ];
        let binning = bin_prices(&records, 10).unwrap();
        let spot = binning.sweet_spot().unwrap();
        assert_eq!(spot.count, 1);
        assert_eq!(spot.revenue, 5000.0);
        assert_eq!(spot.label(), "46-55");
    }

    #[test]
    fn single_price_is_widened() {
        let binning = bin_prices(&[record(50.0, 1.0, 50.0), record(50.0, 1.0, 50.0)], 10).unwrap();
        assert!(binning.edges[0] < 50.0 && binning.edges[10] > 50.0);
        assert_eq!(binning.bins.iter().map(|b| b.count).sum::<usize>(), 2);

        let edges = equal_width_edges(0.0, 0.0, 4);
        assert_eq!(edges.first(), Some(&-0.001));
        assert_eq!(edges.last(), Some(&0.001));
    }

    #[test]
    fn no_prices_is_degenerate() {
        let err = bin_prices(&[ProductRecord::default()], 10).unwrap_err();
        assert_eq!(err, DegenerateInputError::NoObservations("price binning"));
    }
}

use crate::model::{Dimension, GroupSummary, ProductRecord};
use crate::utils::quantile_sorted;
use std::collections::BTreeMap;

/// Metric a grouped table is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMetric {
    Revenue,
    Quantity,
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    revenue: f64,
    quantity: f64,
    price_sum: f64,
    price_n: usize,
    rating_sum: f64,
    rating_n: usize,
}

/// Groups records by `dimension`. Records without a key are left out;
/// missing numeric values are skipped by sums and means alike.
/// Groups come back in key order.
pub fn group_by(records: &[ProductRecord], dimension: Dimension) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for record in records {
        let Some(key) = record.key(dimension) else {
            continue;
        };
        let acc = groups.entry(key).or_default();
        acc.count += 1;
        acc.revenue += record.revenue.unwrap_or(0.0);
        acc.quantity += record.quantity_sold.unwrap_or(0.0);
        if let Some(price) = record.price {
            acc.price_sum += price;
            acc.price_n += 1;
        }
        if let Some(rating) = record.rating {
            acc.rating_sum += rating;
            acc.rating_n += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, acc)| GroupSummary {
            key: key.to_string(),
            count: acc.count,
            revenue: acc.revenue,
            quantity: acc.quantity,
            mean_price: (acc.price_n > 0).then(|| acc.price_sum / acc.price_n as f64),
            mean_rating: (acc.rating_n > 0).then(|| acc.rating_sum / acc.rating_n as f64),
        })
        .collect()
}

/// Stable descending sort by `metric`, truncated to `top_n`.
pub fn rank_by(mut groups: Vec<GroupSummary>, metric: RankMetric, top_n: usize) -> Vec<GroupSummary> {
    let metric_of = |g: &GroupSummary| match metric {
        RankMetric::Revenue => g.revenue,
        RankMetric::Quantity => g.quantity,
    };
    groups.sort_by(|a, b| metric_of(b).total_cmp(&metric_of(a)));
    groups.truncate(top_n);
    groups
}

/// Record counts per key, most frequent first (ties in key order).
pub fn value_counts(records: &[ProductRecord], dimension: Dimension) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in records.iter().filter_map(|r| r.key(dimension)) {
        *counts.entry(key).or_default() += 1;
    }
    let mut result: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    result.sort_by(|a, b| b.1.cmp(&a.1));
    result
}

/// Five-number summary of the prices inside one group.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuartiles {
    pub key: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub count: usize,
}

/// Price quartiles for each of `keys`, in the given order.
/// Keys with no priced record are omitted.
pub fn price_quartiles(
    records: &[ProductRecord],
    dimension: Dimension,
    keys: &[String],
) -> Vec<PriceQuartiles> {
    keys.iter()
        .filter_map(|key| {
            let mut prices: Vec<f64> = records
                .iter()
                .filter(|r| r.key(dimension) == Some(key.as_str()))
                .filter_map(|r| r.price)
                .collect();
            prices.sort_by(f64::total_cmp);
            Some(PriceQuartiles {
                key: key.clone(),
                min: *prices.first()?,
                q1: quantile_sorted(&prices, 0.25)?,
                median: quantile_sorted(&prices, 0.5)?,
                q3: quantile_sorted(&prices, 0.75)?,
                max: *prices.last()?,
                count: prices.len(),
            })
        })
        .collect()
}

/// Group with the highest mean rating (first one on ties).
pub fn best_rated(groups: &[GroupSummary]) -> Option<&GroupSummary> {
    groups
        .iter()
        .filter(|g| g.mean_rating.is_some())
        .fold(None, |best: Option<&GroupSummary>, g| match best {
            Some(b) if b.mean_rating >= g.mean_rating => Some(b),
            _ => Some(g),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn record(brand: Option<&str>, revenue: Option<f64>, qty: Option<f64>, price: Option<f64>, rating: Option<f64>) -> ProductRecord {
        ProductRecord {
            brand: brand.map(String::from),
            revenue,
            quantity_sold: qty,
            price,
            rating,
            ..Default::default()
        }
    }

    #[test]
    fn groups_sum_and_average() {
        let records = vec![
            record(Some("Nike"), Some(100.0), Some(2.0), Some(50.0), Some(4.0)),
            record(Some("Adidas"), Some(300.0), Some(3.0), Some(100.0), None),
            record(Some("Nike"), Some(50.0), None, Some(70.0), Some(5.0)),
        ];
        let groups = group_by(&records, Dimension::Brand);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Adidas");
        assert_eq!(groups[0].mean_rating, None);

        let nike = &groups[1];
        assert_eq!(nike.count, 2);
        assert!((nike.revenue - 150.0).abs() < 1e-9);
        assert!((nike.quantity - 2.0).abs() < 1e-9);
        assert_eq!(nike.mean_price, Some(60.0));
        assert_eq!(nike.mean_rating, Some(4.5));
    }

    #[test]
    fn records_without_key_are_excluded() {
        let records = vec![
            record(None, Some(100.0), None, None, None),
            record(Some(""), Some(100.0), None, None, None),
            record(Some("Puma"), Some(10.0), None, None, None),
        ];
        let groups = group_by(&records, Dimension::Brand);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "Puma");
    }

    #[test]
    fn rank_is_descending_and_stable() {
        let records = vec![
            record(Some("B"), Some(100.0), Some(1.0), None, None),
            record(Some("A"), Some(100.0), Some(9.0), None, None),
            record(Some("C"), Some(500.0), Some(5.0), None, None),
        ];
        let by_revenue = rank_by(group_by(&records, Dimension::Brand), RankMetric::Revenue, 10);
        let keys: Vec<&str> = by_revenue.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["C", "A", "B"]);

        let by_quantity = rank_by(group_by(&records, Dimension::Brand), RankMetric::Quantity, 2);
        let keys: Vec<&str> = by_quantity.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "C"]);
    }

    #[test]
    fn group_revenue_adds_up_to_total() {
        let mut rng = StdRng::seed_from_u64(7);
        let brands = ["Nike", "Adidas", "Puma", "Olympikus", "Mizuno"];
        let records: Vec<ProductRecord> = (0..500)
            .map(|_| {
                let brand = brands[rng.random_range(0..brands.len())];
                let revenue = rng.random_bool(0.9).then(|| rng.random_range(0.0..10_000.0));
                record(Some(brand), revenue, None, None, None)
            })
            .collect();

        let total: f64 = records.iter().filter_map(|r| r.revenue).sum();
        let grouped: f64 = group_by(&records, Dimension::Brand).iter().map(|g| g.revenue).sum();
        assert!((total - grouped).abs() < 1e-6 * total.max(1.0));
    }

    #[test]
    fn value_counts_most_frequent_first() {
        let records: Vec<ProductRecord> = ["Couro", "Tecido", "Couro", "Sintético", "Tecido", "Couro"]
            .iter()
            .map(|m| ProductRecord {
                material: Some(m.to_string()),
                ..Default::default()
            })
            .collect();
        let counts = value_counts(&records, Dimension::Material);
        assert_eq!(
            counts,
            vec![
                ("Couro".to_string(), 3),
                ("Tecido".to_string(), 2),
                ("Sintético".to_string(), 1)
            ]
        );
    }

    #[test]
    fn quartiles_per_key() {
        let records: Vec<ProductRecord> = [10.0, 20.0, 30.0, 40.0, 50.0]
            .iter()
            .map(|p| ProductRecord {
                material: Some("Couro".into()),
                price: Some(*p),
                ..Default::default()
            })
            .collect();
        let keys = vec!["Couro".to_string(), "Lona".to_string()];
        let quartiles = price_quartiles(&records, Dimension::Material, &keys);
        assert_eq!(quartiles.len(), 1);
        let q = &quartiles[0];
        assert_eq!((q.min, q.q1, q.median, q.q3, q.max), (10.0, 20.0, 30.0, 40.0, 50.0));
        assert_eq!(q.count, 5);
    }

    #[test]
    fn best_rated_picks_highest_mean() {
        let records = vec![
            record(Some("A"), None, None, None, Some(4.1)),
            record(Some("B"), None, None, None, Some(4.8)),
            record(Some("C"), None, None, None, None),
        ];
        let groups = group_by(&records, Dimension::Brand);
        assert_eq!(best_rated(&groups).map(|g| g.key.as_str()), Some("B"));
        assert!(best_rated(&[]).is_none());
    }
}

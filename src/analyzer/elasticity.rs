use crate::model::{DegenerateInputError, ProductRecord};

/// Ordinary least squares fit `quantity = intercept + slope * discount`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    pub observations: usize,
    /// The (discount, quantity) pairs the fit was computed on.
    pub points: Vec<(f64, f64)>,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fits quantity sold against discount over records carrying both values.
pub fn fit_elasticity(records: &[ProductRecord]) -> Result<LinearFit, DegenerateInputError> {
    let points: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((r.discount?, r.quantity_sold?)))
        .collect();
    fit_line(points)
}

pub fn fit_line(points: Vec<(f64, f64)>) -> Result<LinearFit, DegenerateInputError> {
    // a single pair defines no line
    if points.len() < 2 {
        return Err(DegenerateInputError::NoObservations("discount elasticity"));
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

    // Constant discount: no slope can be identified.
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = points
        .iter()
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Ok(LinearFit {
        intercept,
        slope,
        r_squared,
        observations: points.len(),
        points,
    })
}

/// Fixed discount ranges: [0,10], (10,20], (20,30], (30,50], (50,100].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountBucket {
    UpTo10,
    UpTo20,
    UpTo30,
    UpTo50,
    Above50,
}

impl DiscountBucket {
    pub const ALL: [DiscountBucket; 5] = [
        DiscountBucket::UpTo10,
        DiscountBucket::UpTo20,
        DiscountBucket::UpTo30,
        DiscountBucket::UpTo50,
        DiscountBucket::Above50,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DiscountBucket::UpTo10 => "0-10%",
            DiscountBucket::UpTo20 => "10-20%",
            DiscountBucket::UpTo30 => "20-30%",
            DiscountBucket::UpTo50 => "30-50%",
            DiscountBucket::Above50 => ">50%",
        }
    }

    /// Bucket of a discount percentage; values outside [0,100] have none.
    pub fn classify(discount: f64) -> Option<DiscountBucket> {
        match discount {
            d if !(0.0..=100.0).contains(&d) => None,
            d if d <= 10.0 => Some(DiscountBucket::UpTo10),
            d if d <= 20.0 => Some(DiscountBucket::UpTo20),
            d if d <= 30.0 => Some(DiscountBucket::UpTo30),
            d if d <= 50.0 => Some(DiscountBucket::UpTo50),
            _ => Some(DiscountBucket::Above50),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketRevenue {
    pub bucket: DiscountBucket,
    pub revenue: f64,
    pub count: usize,
}

/// Revenue per discount bucket; all five buckets are always present.
pub fn discount_buckets(records: &[ProductRecord]) -> Vec<BucketRevenue> {
    let mut result: Vec<BucketRevenue> = DiscountBucket::ALL
        .iter()
        .map(|&bucket| BucketRevenue {
            bucket,
            revenue: 0.0,
            count: 0,
        })
        .collect();

    for record in records {
        let Some(bucket) = record.discount.and_then(DiscountBucket::classify) else {
            continue;
        };
        let slot = &mut result[bucket as usize];
        slot.revenue += record.revenue.unwrap_or(0.0);
        slot.count += 1;
    }
    result
}

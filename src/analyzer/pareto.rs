use crate::model::{DegenerateInputError, ProductRecord};
use std::fmt;

pub const CLASS_A_LIMIT: f64 = 80.0;
pub const CLASS_B_LIMIT: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbcClass {
    A,
    B,
    C,
}

impl AbcClass {
    pub fn from_cumulative_percent(percent: f64) -> Self {
        if percent <= CLASS_A_LIMIT {
            AbcClass::A
        } else if percent <= CLASS_B_LIMIT {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbcClass::A => "A",
            AbcClass::B => "B",
            AbcClass::C => "C",
        };
        f.write_str(name)
    }
}

/// One record in Pareto order.
#[derive(Debug, Clone, PartialEq)]
pub struct AbcEntry {
    /// Position of the record in the loaded dataset.
    pub row: usize,
    pub revenue: f64,
    pub cumulative_revenue: f64,
    pub cumulative_percent: f64,
    pub class: AbcClass,
}

#[derive(Debug, Clone)]
pub struct AbcReport {
    pub entries: Vec<AbcEntry>,
    pub total_revenue: f64,
}

impl AbcReport {
    pub fn count(&self, class: AbcClass) -> usize {
        self.entries.iter().filter(|e| e.class == class).count()
    }

    /// Share of classified records (0-100) belonging to `class`.
    pub fn share_of_records(&self, class: AbcClass) -> f64 {
        self.count(class) as f64 / self.entries.len() as f64 * 100.0
    }

    pub fn revenue_of(&self, class: AbcClass) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.class == class)
            .map(|e| e.revenue)
            .sum()
    }
}

/// Pareto/ABC classification of records by revenue.
/// Records without revenue are not classified. A zero total has no
/// defined shares and is reported as degenerate input.
pub fn classify_abc(records: &[ProductRecord]) -> Result<AbcReport, DegenerateInputError> {
    let mut ranked: Vec<(usize, f64)> = records
        .iter()
        .enumerate()
        .filter_map(|(row, r)| r.revenue.map(|rev| (row, rev)))
        .collect();
    if ranked.is_empty() {
        return Err(DegenerateInputError::NoObservations("ABC classification"));
    }

    // sort_by is stable: equal revenues keep their row order
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let total_revenue: f64 = ranked.iter().map(|(_, rev)| rev).sum();
    if total_revenue <= 0.0 {
        return Err(DegenerateInputError::ZeroTotal("revenue"));
    }

    let mut running = 0.0;
    let entries = ranked
        .into_iter()
        .map(|(row, revenue)| {
            running += revenue;
            let cumulative_percent = running * 100.0 / total_revenue;
            AbcEntry {
                row,
                revenue,
                cumulative_revenue: running,
                cumulative_percent,
                class: AbcClass::from_cumulative_percent(cumulative_percent),
            }
        })
        .collect();

    Ok(AbcReport {
        entries,
        total_revenue,
    })
}

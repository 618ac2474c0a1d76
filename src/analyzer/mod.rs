// Analyzer module: one submodule per business question.

pub mod aggregation;
pub mod distribution;
pub mod elasticity;
pub mod pareto;
pub mod price_bins;
pub mod sentiment;

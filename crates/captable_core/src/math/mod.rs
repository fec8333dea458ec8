//! Numerical building blocks for waterfall and return computations.
//!
//! This module provides:
//! - `rounding`: Conserving pro-rata allocation of integer money
//! - `stats`: Weighted empirical CDF and percentile extraction
//! - `solvers`: Root-finding solvers for irregular cash-flow returns

pub mod rounding;
pub mod solvers;
pub mod stats;

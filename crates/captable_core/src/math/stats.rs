//! Weighted empirical distribution statistics.
//!
//! Exit-value distributions arrive in two forms: a handful of discrete
//! scenarios with explicit probabilities, or thousands of Monte Carlo
//! samples with equal weight. Both reduce to the same structure, a
//! weighted empirical CDF, from which medians and percentile bands are
//! read off.
//!
//! # Examples
//!
//! ```
//! use captable_core::math::stats::WeightedCdf;
//!
//! // Three discrete outcomes: shutdown, acquisition, IPO
//! let cdf = WeightedCdf::new(vec![
//!     (0.0, 0.3),
//!     (50_000_000.0, 0.5),
//!     (200_000_000.0, 0.2),
//! ]).unwrap();
//!
//! assert_eq!(cdf.quantile(0.5), 50_000_000.0);
//! assert_eq!(cdf.quantile(0.9), 200_000_000.0);
//! assert!((cdf.mean() - 65_000_000.0).abs() < 1e-6);
//! ```

use thiserror::Error;

/// Errors from building a weighted distribution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// No samples were supplied.
    #[error("Cannot build a distribution from zero samples")]
    Empty,

    /// A sample value was NaN or infinite.
    #[error("Sample value {value} at index {index} is not finite")]
    InvalidValue {
        /// Position of the offending sample.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// A weight was negative, NaN, or infinite, or all weights were zero.
    #[error("Invalid weight {value} at index {index}")]
    InvalidWeight {
        /// Position of the offending weight.
        index: usize,
        /// The offending weight.
        value: f64,
    },
}

/// Weighted empirical cumulative distribution over f64 samples.
///
/// Samples are sorted by value once at construction; quantile queries
/// are then a binary scan over cumulative weights. Weights need not be
/// normalised.
#[derive(Debug, Clone)]
pub struct WeightedCdf {
    /// (value, cumulative weight) sorted ascending by value.
    steps: Vec<(f64, f64)>,
    /// Sum of all weights.
    total_weight: f64,
    /// Probability-weighted mean of the values.
    mean: f64,
}

impl WeightedCdf {
    /// Builds a CDF from (value, weight) pairs.
    ///
    /// # Arguments
    /// * `samples` - Unsorted (value, weight) pairs; weights need not sum to 1
    ///
    /// # Errors
    /// - `StatsError::Empty` when no samples are given
    /// - `StatsError::InvalidValue` for NaN or infinite values
    /// - `StatsError::InvalidWeight` for negative, non-finite, or all-zero weights
    pub fn new(samples: Vec<(f64, f64)>) -> Result<Self, StatsError> {
        if samples.is_empty() {
            return Err(StatsError::Empty);
        }
        for (index, &(value, weight)) in samples.iter().enumerate() {
            if !value.is_finite() {
                return Err(StatsError::InvalidValue { index, value });
            }
            if !weight.is_finite() || weight < 0.0 {
                return Err(StatsError::InvalidWeight {
                    index,
                    value: weight,
                });
            }
        }

        let mut sorted = samples;
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let total_weight: f64 = sorted.iter().map(|&(_, w)| w).sum();
        if total_weight <= 0.0 {
            return Err(StatsError::InvalidWeight {
                index: 0,
                value: 0.0,
            });
        }

        let mean = sorted.iter().map(|&(v, w)| v * w).sum::<f64>() / total_weight;

        let mut cumulative = 0.0;
        let steps = sorted
            .into_iter()
            .map(|(value, weight)| {
                cumulative += weight;
                (value, cumulative)
            })
            .collect();

        Ok(Self {
            steps,
            total_weight,
            mean,
        })
    }

    /// Builds a CDF from equally weighted samples (Monte Carlo mode).
    ///
    /// # Errors
    /// Same conditions as [`WeightedCdf::new`].
    pub fn from_samples(values: Vec<f64>) -> Result<Self, StatsError> {
        Self::new(values.into_iter().map(|v| (v, 1.0)).collect())
    }

    /// The smallest value whose cumulative probability reaches `p`.
    ///
    /// `p` is clamped to [0, 1]. For equally weighted samples this is
    /// the classical order statistic; for discrete scenarios it reads
    /// the step CDF directly.
    pub fn quantile(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        let target = p * self.total_weight;
        for &(value, cumulative) in &self.steps {
            if cumulative >= target {
                return value;
            }
        }
        // Cumulative weights end at total_weight, so only f64 noise can
        // get us here; answer with the maximum.
        self.steps[self.steps.len() - 1].0
    }

    /// The median (0.5 quantile).
    pub fn median(&self) -> f64 {
        self.quantile(0.5)
    }

    /// Probability-weighted mean of the values.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Total probability mass of samples strictly greater than `floor`.
    ///
    /// Returned as a fraction of the total weight, so the result is a
    /// probability even when weights are unnormalised sample counts.
    pub fn mass_above(&self, floor: f64) -> f64 {
        let mut below = 0.0;
        for &(value, cumulative) in &self.steps {
            if value > floor {
                break;
            }
            below = cumulative;
        }
        (self.total_weight - below) / self.total_weight
    }

    /// Number of distinct sample points.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the CDF holds no samples (never constructed; `new`
    /// rejects empty input).
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

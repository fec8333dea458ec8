//! # captable_pwerm (L4: Valuation Layer)
//!
//! Probability-weighted expected return (PWERM) valuation over the
//! waterfall engine.
//!
//! This crate provides:
//! - Discrete exit scenarios with probability validation
//! - Seeded log-normal Monte Carlo exit sampling
//! - The PWERM aggregator: expected and discounted exit values,
//!   weighted-CDF percentiles, success and IPO probabilities, and
//!   per-class MOIC/IRR
//! - Exit-value and term-structure sensitivity sweeps
//!
//! ## Design Principles
//!
//! - **Explicit inputs**: scenarios, discount rates, and samplers are
//!   fully-specified values; nothing is fetched or defaulted ambiently
//! - **Reproducibility**: a seed pins every Monte Carlo sequence, so
//!   identical runs produce identical summaries
//! - **Cooperative cancellation**: long runs check a shared token
//!   between sample chunks and abort cleanly

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod aggregator;
pub mod error;
pub mod parallel;
pub mod request;
pub mod returns;
pub mod sampler;
pub mod scenario;
pub mod sensitivity;

pub use aggregator::{CancelToken, PwermAggregator, PwermConfig, PwermSummary};
pub use error::PwermError;
pub use sampler::{MonteCarloConfig, MonteCarloSampler};
pub use scenario::{ExitScenario, ExitType};
pub use sensitivity::{SensitivityAnalyzer, TermVariant};

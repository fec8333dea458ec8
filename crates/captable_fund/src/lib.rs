//! # captable_fund (L4: Fund Composition)
//!
//! Fund-level LP/GP distribution over per-company exit allocations.
//!
//! This crate provides:
//! - Fund terms (committed capital, hurdle, carry, catch-up) with
//!   validation
//! - The four-tier fund waterfall, applied to total proceeds or summed
//!   across a portfolio of company allocations

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod distributor;
pub mod error;
pub mod terms;

pub use distributor::{CompanyHolding, FundDistribution, FundDistributor};
pub use error::FundError;
pub use terms::FundTerms;

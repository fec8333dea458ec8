//! # captable_waterfall (L3: Allocation Engine)
//!
//! Liquidation-waterfall allocation of exit proceeds across a cap table.
//!
//! This crate provides:
//! - The waterfall engine: seniority-ordered preferences, pari passu
//!   splits, participation with caps, and IPO-ratchet floors
//! - A bounded fixed-point solver for the joint conversion election
//! - Single-call convenience formulas for term-sheet arithmetic
//! - Serde request/response types for the allocation boundary
//!
//! ## Design Principles
//!
//! - **Pure functions**: `allocate` is a function of the snapshot and
//!   the exit terms; no state, no I/O, trivially parallelizable
//! - **Bounded iteration**: the election solver never recurses and
//!   never loops unbounded; non-convergence is a flag, not an error
//! - **Conservation**: every allocation sums back to the exit value
//!   within one cent, with the remainder pinned to the most senior class

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod engine;
pub mod error;
pub mod formulas;
mod participation;
mod preference;
pub mod ratchet;
pub mod request;
pub mod result;

pub use engine::{ExitTerms, WaterfallEngine};
pub use error::WaterfallError;
pub use ratchet::RatchetTerms;
pub use result::{ClassOutcome, Election, WaterfallResult};

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        assert_eq!(2 + 2, 4);
    }
}

//! # captable_core: Foundation Types for Cap-Table Analytics
//!
//! ## Layer 1 (Foundation) Role
//!
//! captable_core is the bottom layer of the workspace, providing:
//! - Exact money arithmetic in integer minor units (`types::money`)
//! - Strongly-typed identifiers for share classes, rounds, and scenarios (`types::ids`)
//! - Time types: `Date` and ACT/365F year fractions (`types::time`)
//! - Error types: `MoneyError`, `DateError`, `SolverError` (`types::error`)
//! - Conserving pro-rata allocation (`math::rounding`)
//! - Distribution statistics for exit-value samples (`math::stats`)
//! - Root-finding solvers for irregular cash-flow returns (`math::solvers`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other captable_* crates, with minimal
//! external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - chrono: Date arithmetic
//! - thiserror: Error derivation
//! - serde: Serialisation of boundary types
//!
//! ## Usage Examples
//!
//! ```rust
//! use captable_core::types::{Date, Money};
//! use captable_core::math::rounding::allocate_pro_rata;
//!
//! // Money is carried in integer cents and only surfaces as dollars
//! let invested = Money::from_dollars(1_000_000.0).unwrap();
//! assert_eq!(invested.cents(), 100_000_000);
//!
//! // Pro-rata splits conserve the total exactly
//! let parts = allocate_pro_rata(invested, &[1.0, 1.0, 1.0]).unwrap();
//! let total: Money = parts.iter().copied().sum();
//! assert_eq!(total, invested);
//!
//! // Date arithmetic for dividend accrual
//! let start = Date::from_ymd(2020, 1, 1).unwrap();
//! let end = Date::from_ymd(2024, 1, 1).unwrap();
//! assert!((start.years_until(end) - 4.0).abs() < 0.01);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;

#[cfg(test)]
mod tests {
    #[test]
    fn it_works() {
        assert_eq!(2 + 2, 4);
    }
}

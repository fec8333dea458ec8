//! # captable_model (L2: Domain Model)
//!
//! Cap-table value types and round-by-round ownership evolution.
//!
//! This crate provides:
//! - Share-class definitions with preference, participation, dividend,
//!   and anti-dilution terms
//! - Financing-round definitions and the class terms they create
//! - Validated point-in-time snapshots of a cap table
//! - The evolution tracker replaying rounds into a snapshot time series
//!
//! ## Design Principles
//!
//! - **Immutable snapshots**: tables are mutated only inside the
//!   evolution tracker; everything downstream consumes validated,
//!   immutable snapshots
//! - **Validate once, at the boundary**: snapshot construction runs the
//!   full invariant check so allocation code never re-validates
//! - **Errors carry ids**: every rejection names the offending class or
//!   round

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod error;
pub mod evolution;
pub mod round;
pub mod share_class;
pub mod snapshot;

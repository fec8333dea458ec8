//! Command implementations.

pub mod evolve;
pub mod fund;
pub mod pwerm;
pub mod sweep;
pub mod waterfall;

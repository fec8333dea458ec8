//! JSON request/response contract for the allocation boundary.
//!
//! The engine itself is a library; these types exist so an in-process
//! caller, a CLI, or a thin RPC layer can all speak the same shape.
//! Dollar amounts cross the boundary as plain numbers.

use std::collections::BTreeMap;

use captable_core::types::{Date, Money};
use captable_model::share_class::ShareClass;
use captable_model::snapshot::CapTableSnapshot;
use serde::{Deserialize, Serialize};

use crate::engine::WaterfallEngine;
use crate::error::WaterfallError;
use crate::result::{Election, WaterfallResult};

/// An `allocate` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    /// Share classes making up the cap table.
    pub share_classes: Vec<ShareClass>,
    /// Exit value to distribute, in dollars.
    pub exit_value: Money,
    /// Snapshot date; defaults to today. Only matters when a class
    /// accrues cumulative dividends.
    #[serde(default)]
    pub as_of: Option<Date>,
}

impl AllocationRequest {
    /// Validates the cap table and runs the allocation.
    ///
    /// # Errors
    ///
    /// Returns [`WaterfallError`] for a malformed cap table or a
    /// negative exit value.
    pub fn run(&self) -> Result<AllocationResponse, WaterfallError> {
        let as_of = self.as_of.unwrap_or_else(Date::today);
        let snapshot = CapTableSnapshot::new(self.share_classes.clone(), as_of)?;
        let result = WaterfallEngine::new().allocate(&snapshot, self.exit_value)?;
        Ok(AllocationResponse::from_result(&result))
    }
}

/// An `allocate` response: proceeds and elections keyed by class id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    /// Proceeds per class, in dollars.
    pub proceeds: BTreeMap<String, f64>,
    /// Election per class.
    pub elections: BTreeMap<String, Election>,
    /// Whether the election fixed point was reached.
    pub converged: bool,
}

impl AllocationResponse {
    /// Flattens a [`WaterfallResult`] into the wire shape.
    pub fn from_result(result: &WaterfallResult) -> Self {
        let mut proceeds = BTreeMap::new();
        let mut elections = BTreeMap::new();
        for outcome in &result.outcomes {
            proceeds.insert(outcome.class_id.to_string(), outcome.proceeds.to_dollars());
            elections.insert(outcome.class_id.to_string(), outcome.election);
        }
        Self {
            proceeds,
            elections,
            converged: result.converged,
        }
    }
}

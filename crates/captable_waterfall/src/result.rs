//! Waterfall allocation results.

use captable_core::types::{ClassId, Money};
use serde::{Deserialize, Serialize};

/// How a preferred class takes its exit proceeds.
///
/// Common classes are always reported as `Converted`: they hold common
/// stock and share only in the residual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Election {
    /// Take the liquidation preference (plus participation, if any).
    Preferred,
    /// Convert to common and share pro-rata in the residual.
    Converted,
}

impl Election {
    /// The other election.
    #[inline]
    pub fn flipped(self) -> Election {
        match self {
            Election::Preferred => Election::Converted,
            Election::Converted => Election::Preferred,
        }
    }
}

/// Exit outcome for one share class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassOutcome {
    /// The class.
    pub class_id: ClassId,
    /// Proceeds allocated to the class.
    pub proceeds: Money,
    /// The election the class reached at the fixed point.
    pub election: Election,
    /// Return multiple on invested capital (0 for common).
    pub return_multiple: f64,
    /// As-converted ownership fraction at exit.
    pub ownership_at_exit: f64,
}

/// Complete allocation of one exit value across a cap table.
///
/// Outcomes appear in snapshot order. `converged = false` means the
/// election fixed point was not reached within the iteration cap and
/// the allocation is the last iteration's best effort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallResult {
    /// The exit value that was distributed.
    pub exit_value: Money,
    /// Per-class outcomes in snapshot order.
    pub outcomes: Vec<ClassOutcome>,
    /// Whether the election fixed point was reached.
    pub converged: bool,
    /// Number of election sweeps performed.
    pub iterations: usize,
}

impl WaterfallResult {
    /// Proceeds of a class, if present.
    pub fn proceeds_of(&self, id: &ClassId) -> Option<Money> {
        self.outcomes
            .iter()
            .find(|o| &o.class_id == id)
            .map(|o| o.proceeds)
    }

    /// Election of a class, if present.
    pub fn election_of(&self, id: &ClassId) -> Option<Election> {
        self.outcomes
            .iter()
            .find(|o| &o.class_id == id)
            .map(|o| o.election)
    }

    /// Sum of all allocated proceeds.
    pub fn total_proceeds(&self) -> Money {
        self.outcomes.iter().map(|o| o.proceeds).sum()
    }
}

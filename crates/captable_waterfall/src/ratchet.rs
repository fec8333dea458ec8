//! IPO-ratchet return floors.

use captable_core::math::rounding::allocate_by_amounts;
use captable_core::types::{ClassId, Money};
use serde::{Deserialize, Serialize};

use crate::engine::ClassEconomics;
use crate::error::WaterfallError;

/// An IPO ratchet guaranteeing a class a minimum return multiple.
///
/// Applies only to IPO exits. When the class's allocated proceeds fall
/// short of `guaranteed_multiple * invested`, the shortfall is clawed
/// back from common holders and junior preferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatchetTerms {
    /// The protected class.
    pub class_id: ClassId,
    /// Guaranteed return multiple on invested capital.
    pub guaranteed_multiple: f64,
}

impl RatchetTerms {
    /// Creates ratchet terms.
    pub fn new(class_id: impl Into<String>, guaranteed_multiple: f64) -> Self {
        Self {
            class_id: ClassId::new(class_id),
            guaranteed_multiple,
        }
    }
}

/// Floors the protected class's proceeds at its guaranteed multiple.
///
/// The top-up is funded pro-rata (by current proceeds) from common
/// holders and preferred classes junior to the protected class; senior
/// and pari passu preferred are never touched. The clawback is capped
/// at what those contributors actually received, so no contributor can
/// be driven negative. Returns whether the floor fired.
pub(crate) fn apply_ipo_floor(
    economics: &[ClassEconomics],
    protected: usize,
    terms: &RatchetTerms,
    proceeds: &mut [Money],
) -> Result<bool, WaterfallError> {
    let floor = economics[protected]
        .invested
        .mul_f64(terms.guaranteed_multiple)?;
    if proceeds[protected] >= floor {
        return Ok(false);
    }
    let shortfall = floor - proceeds[protected];

    // Lower rank = more senior; only common and strictly junior
    // preferred fund the floor.
    let rank = economics[protected].seniority;
    let contributors: Vec<usize> = economics
        .iter()
        .enumerate()
        .filter(|&(i, econ)| i != protected && (!econ.preferred || econ.seniority > rank))
        .map(|(i, _)| i)
        .collect();
    let available: Money = contributors.iter().map(|&i| proceeds[i]).sum();
    let clawback = shortfall.min(available);
    if clawback.is_zero() {
        return Ok(false);
    }

    let weights: Vec<Money> = contributors.iter().map(|&i| proceeds[i]).collect();
    let parts = allocate_by_amounts(clawback, &weights)?;
    for (slot, &index) in contributors.iter().enumerate() {
        proceeds[index] -= parts[slot];
    }
    proceeds[protected] += clawback;
    Ok(true)
}

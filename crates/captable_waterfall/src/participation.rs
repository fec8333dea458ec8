//! Residual distribution and participation-cap enforcement.

use captable_core::math::rounding::allocate_pro_rata;
use captable_core::types::Money;

use crate::engine::ClassEconomics;
use crate::error::WaterfallError;
use crate::result::Election;

/// Whether a class shares in the residual under the given election.
///
/// Common always does; preferred does when converted, or when taking
/// its preference with participation rights.
#[inline]
pub(crate) fn shares_in_residual(econ: &ClassEconomics, election: Election) -> bool {
    !econ.preferred || election == Election::Converted || econ.participating
}

/// Distributes the residual pool pro-rata by as-converted shares among
/// common, converted, and participating classes, adding to `proceeds`.
///
/// When no class shares in the residual (every preferred class sits on
/// a non-participating preference) the pool is returned undistributed
/// for the caller to sink.
pub(crate) fn distribute_residual(
    economics: &[ClassEconomics],
    elections: &[Election],
    pool: Money,
    proceeds: &mut [Money],
) -> Result<Money, WaterfallError> {
    if pool.is_zero() {
        return Ok(Money::ZERO);
    }

    let weights: Vec<f64> = economics
        .iter()
        .zip(elections)
        .map(|(econ, &election)| {
            if shares_in_residual(econ, election) {
                econ.as_converted
            } else {
                0.0
            }
        })
        .collect();

    if weights.iter().sum::<f64>() <= 0.0 {
        return Ok(pool);
    }

    let parts = allocate_pro_rata(pool, &weights)?;
    for (index, part) in parts.into_iter().enumerate() {
        proceeds[index] += part;
    }
    Ok(Money::ZERO)
}

/// Enforces participation caps, reallocating the excess.
///
/// A capped participating class taking its preference keeps at most
/// `cap_multiple * invested` in total; the excess moves pro-rata (by
/// as-converted shares) to residual participants not at their own cap.
/// Reallocation can push another capped class over its cap, so the pass
/// repeats; each pass pins at least one class, bounding the loop.
///
/// Returns any excess that had nowhere left to go (every participant
/// capped), for the caller to sink.
pub(crate) fn enforce_caps(
    economics: &[ClassEconomics],
    elections: &[Election],
    proceeds: &mut [Money],
) -> Result<Money, WaterfallError> {
    let at_cap = |econ: &ClassEconomics, election: Election, amount: Money| -> bool {
        match econ.cap {
            Some(cap) => election == Election::Preferred && amount >= cap,
            None => false,
        }
    };

    for _ in 0..=economics.len() {
        let mut excess = Money::ZERO;
        for (index, econ) in economics.iter().enumerate() {
            if let Some(cap) = econ.cap {
                if elections[index] == Election::Preferred && proceeds[index] > cap {
                    excess += proceeds[index] - cap;
                    proceeds[index] = cap;
                }
            }
        }
        if excess.is_zero() {
            return Ok(Money::ZERO);
        }

        let weights: Vec<f64> = economics
            .iter()
            .zip(elections)
            .enumerate()
            .map(|(index, (econ, &election))| {
                if shares_in_residual(econ, election) && !at_cap(econ, election, proceeds[index]) {
                    econ.as_converted
                } else {
                    0.0
                }
            })
            .collect();

        if weights.iter().sum::<f64>() <= 0.0 {
            return Ok(excess);
        }

        let parts = allocate_pro_rata(excess, &weights)?;
        for (index, part) in parts.into_iter().enumerate() {
            proceeds[index] += part;
        }
    }

    Ok(Money::ZERO)
}

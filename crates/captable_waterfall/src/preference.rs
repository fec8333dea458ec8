//! Seniority-ordered payment of liquidation preferences.

use std::collections::BTreeMap;

use captable_core::math::rounding::allocate_by_amounts;
use captable_core::types::Money;

use crate::engine::ClassEconomics;
use crate::error::WaterfallError;
use crate::result::Election;

/// Pays liquidation preferences to every preferred class currently
/// electing `Preferred`, most senior rank first.
///
/// Within a rank the classes are pari passu: when the pool cannot cover
/// the rank's total claim, the available funds split pro-rata by
/// invested amount, with any class's over-allocation (a small claim on
/// a large cheque) recycled to the classes still short. A class whose
/// rank is never reached gets nothing; preferences are non-recourse.
///
/// Returns the per-class payments and the pool left for the residual.
pub(crate) fn pay_preference_stack(
    economics: &[ClassEconomics],
    elections: &[Election],
    pool: Money,
) -> Result<(Vec<Money>, Money), WaterfallError> {
    let mut proceeds = vec![Money::ZERO; economics.len()];
    let mut remaining = pool;

    let mut ranks: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (index, econ) in economics.iter().enumerate() {
        if econ.preferred && elections[index] == Election::Preferred {
            ranks.entry(econ.seniority).or_default().push(index);
        }
    }

    for group in ranks.values() {
        if remaining.is_zero() {
            break;
        }
        let total_claim: Money = group.iter().map(|&i| economics[i].claim).sum();
        if remaining >= total_claim {
            for &index in group {
                proceeds[index] = economics[index].claim;
            }
            remaining -= total_claim;
            continue;
        }

        // Insufficient rank: split by invested amount, recycling any
        // allocation beyond a class's claim back to the classes still
        // short. Each pass satisfies at least one class, so the loop is
        // bounded by the group size.
        let mut unpaid: Vec<usize> = group.clone();
        for _ in 0..=group.len() {
            if remaining.is_zero() || unpaid.is_empty() {
                break;
            }
            let weights: Vec<Money> = unpaid.iter().map(|&i| economics[i].invested).collect();
            let parts = allocate_by_amounts(remaining, &weights)?;
            let mut still_short = Vec::new();
            for (slot, &index) in unpaid.iter().enumerate() {
                let due = economics[index].claim - proceeds[index];
                let paid = parts[slot].min(due);
                proceeds[index] += paid;
                remaining -= paid;
                if proceeds[index] < economics[index].claim {
                    still_short.push(index);
                }
            }
            unpaid = still_short;
        }
    }

    Ok((proceeds, remaining))
}

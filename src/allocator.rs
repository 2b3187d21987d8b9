//! Quota allocation: capacities + total budget + minimum → per-stratum quotas.
//!
//! Pure and total: no I/O, no randomness, never panics. Output invariants:
//! every quota is capped by its capacity, the allocated sum never exceeds the
//! requested total, and when the budget can cover `min_per_stratum` for every
//! stratum it does so before any proportional spending.

use std::cmp::Reverse;

use indexmap::IndexMap;

use crate::constants::allocator::ROUND_ROBIN_PASSES;
use crate::key::StratumKey;

/// Allocate `total` sample slots across strata with the given capacities.
///
/// Two regimes, chosen by comparing `total` against
/// `live_strata * min_per_stratum`:
///
/// - insufficient budget for the floor: even split, then round-robin over
///   strata ordered capacity-descending until the budget is spent;
/// - sufficient budget: floor of `min_per_stratum` per stratum, remainder
///   split proportionally to remaining capacity (truncated), leftovers
///   round-robin by remaining headroom.
///
/// Both round-robin walks are bounded at `2 * strata` steps, so the function
/// terminates even when every stratum saturates; the result may then allocate
/// less than `total`, which is a valid outcome.
///
/// Strata with capacity 0 are dropped and never appear in the result. An
/// empty capacity map or `total == 0` yields all-zero quotas.
pub fn allocate_quotas(
    total: usize,
    capacities: &IndexMap<StratumKey, usize>,
    min_per_stratum: usize,
) -> IndexMap<StratumKey, usize> {
    if capacities.is_empty() || total == 0 {
        return capacities.keys().map(|key| (key.clone(), 0)).collect();
    }

    // Zero-capacity strata cannot receive anything; drop them up front.
    let live: Vec<(&StratumKey, usize)> = capacities
        .iter()
        .filter(|(_, capacity)| **capacity > 0)
        .map(|(key, capacity)| (key, *capacity))
        .collect();
    if live.is_empty() {
        return IndexMap::new();
    }

    let min_total = live.len() * min_per_stratum;
    if total < min_total {
        return allocate_even_split(total, &live);
    }
    allocate_floor_then_proportional(total, &live, min_per_stratum)
}

/// Regime A: the budget cannot honor the floor everywhere, so split evenly
/// and hand out the truncation shortfall largest-stratum-first.
fn allocate_even_split(total: usize, live: &[(&StratumKey, usize)]) -> IndexMap<StratumKey, usize> {
    let base = total / live.len();
    let mut quotas: Vec<usize> = live
        .iter()
        .map(|(_, capacity)| base.min(*capacity))
        .collect();
    let mut allocated: usize = quotas.iter().sum();

    // Stable sort keeps table order for equal capacities.
    let mut order: Vec<usize> = (0..live.len()).collect();
    order.sort_by_key(|&idx| Reverse(live[idx].1));

    let mut step = 0;
    while allocated < total && step < order.len() * ROUND_ROBIN_PASSES {
        let idx = order[step % order.len()];
        if quotas[idx] < live[idx].1 {
            quotas[idx] += 1;
            allocated += 1;
        }
        step += 1;
    }

    collect_quotas(live, &quotas)
}

/// Regime B: guarantee the minimum first, then spend the remainder
/// proportionally to remaining capacity, largest-remainder style.
fn allocate_floor_then_proportional(
    total: usize,
    live: &[(&StratumKey, usize)],
    min_per_stratum: usize,
) -> IndexMap<StratumKey, usize> {
    let floors: Vec<usize> = live
        .iter()
        .map(|(_, capacity)| min_per_stratum.min(*capacity))
        .collect();
    let assigned: usize = floors.iter().sum();
    if assigned >= total {
        return collect_quotas(live, &floors);
    }
    let remaining = total - assigned;

    let cap_rem: Vec<usize> = live
        .iter()
        .zip(&floors)
        .map(|((_, capacity), floor)| capacity - floor)
        .collect();
    let rem_total: usize = cap_rem.iter().sum();
    if rem_total == 0 {
        return collect_quotas(live, &floors);
    }

    // Proportional pass, truncated toward zero; under-allocates by the sum of
    // fractional remainders.
    let mut extras: Vec<usize> = vec![0; live.len()];
    let mut running = 0;
    for idx in 0..live.len() {
        if cap_rem[idx] == 0 {
            continue;
        }
        let proportion = cap_rem[idx] as f64 / rem_total as f64;
        let add = ((remaining as f64 * proportion).floor() as usize).min(cap_rem[idx]);
        extras[idx] = add;
        running += add;
    }

    let mut leftover = remaining - running;
    if leftover > 0 {
        let mut order: Vec<usize> = (0..live.len()).collect();
        order.sort_by_key(|&idx| Reverse(cap_rem[idx] - extras[idx]));

        let mut step = 0;
        while leftover > 0 && step < order.len() * ROUND_ROBIN_PASSES {
            let idx = order[step % order.len()];
            if extras[idx] < cap_rem[idx] {
                extras[idx] += 1;
                leftover -= 1;
            }
            step += 1;
        }
    }

    live.iter()
        .zip(floors.iter().zip(&extras))
        .map(|((key, _), (floor, extra))| ((*key).clone(), floor + extra))
        .collect()
}

fn collect_quotas(live: &[(&StratumKey, usize)], quotas: &[usize]) -> IndexMap<StratumKey, usize> {
    live.iter()
        .zip(quotas)
        .map(|((key, _), quota)| ((*key).clone(), *quota))
        .collect()
}

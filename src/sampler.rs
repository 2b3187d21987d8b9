//! Stratified draw: strata from a table, quotas, per-stratum random picks,
//! and a global top-up pass that restores the requested overall size.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use rand::Rng;
use tracing::{debug, warn};

use crate::allocator::allocate_quotas;
use crate::constants::cli::{
    DEFAULT_ID_COLUMN, DEFAULT_MIN_PER_STRATUM, DEFAULT_SEED, DEFAULT_STRAT_COLUMNS,
};
use crate::constants::sampler::SUBSEED_BOUND;
use crate::data::{Unit, UnitTable};
use crate::errors::SamplerError;
use crate::key::{StratumKey, StratumKeyBuilder};
use crate::types::ColumnName;

#[derive(Debug, Clone)]
/// Small deterministic RNG (splitmix64) used for reproducible draws.
///
/// One instance is owned per sampling run; child streams are derived from it
/// via bounded sub-seeds so the consumption order stays deterministic.
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Draw a bounded sub-seed for a child stream.
    fn subseed(&mut self) -> u64 {
        self.random_range(0..SUBSEED_BOUND)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Configuration for one stratified sampling run.
#[derive(Clone, Debug)]
pub struct SamplePlan {
    /// Unique-identifier column; rows with a missing id are dropped.
    pub id_column: ColumnName,
    /// Stratification columns, in key order.
    pub strat_columns: Vec<ColumnName>,
    /// Desired total sample size (clamped to the eligible population).
    pub target_n: usize,
    /// RNG seed that controls the whole draw.
    pub seed: u64,
    /// Minimum units to aim for per non-empty stratum.
    pub min_per_stratum: usize,
}

impl Default for SamplePlan {
    fn default() -> Self {
        Self {
            id_column: DEFAULT_ID_COLUMN.to_string(),
            strat_columns: DEFAULT_STRAT_COLUMNS
                .iter()
                .map(|column| column.to_string())
                .collect(),
            target_n: 0,
            seed: DEFAULT_SEED,
            min_per_stratum: DEFAULT_MIN_PER_STRATUM,
        }
    }
}

/// Draw a stratified random sample from `table` according to `plan`.
///
/// Units are grouped into strata by the normalized values of
/// `plan.strat_columns`, quotas are allocated proportionally with a
/// per-stratum minimum, each stratum is drawn without replacement, and a
/// global top-up restores the overall size when small strata fall short.
///
/// The selection never exceeds `min(target_n, eligible units)` and reaches it
/// whenever enough units remain after dropping rows with a missing id. The
/// same seed over the same input reproduces the same selection.
///
/// Fails eagerly when `plan.id_column` or any stratification column is not in
/// the table header; degenerate inputs (no rows, `target_n == 0`) are not
/// errors and yield an empty selection.
pub fn stratified_sample(table: &UnitTable, plan: &SamplePlan) -> Result<Vec<Unit>, SamplerError> {
    if !table.has_column(&plan.id_column) {
        return Err(SamplerError::MissingIdColumn(plan.id_column.clone()));
    }
    let missing: Vec<ColumnName> = plan
        .strat_columns
        .iter()
        .filter(|column| !table.has_column(column))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(SamplerError::MissingStratColumns(missing));
    }

    // Rows without an id cannot be selected or reported; drop them first.
    let eligible: Vec<&Unit> = table
        .units
        .iter()
        .filter(|unit| unit.field(&plan.id_column).is_some())
        .collect();
    debug!(
        rows = table.len(),
        eligible = eligible.len(),
        "filtered rows with missing ids"
    );
    warn_on_duplicate_ids(&eligible, &plan.id_column);

    let builder = StratumKeyBuilder::new(plan.strat_columns.clone());
    let keys: Vec<StratumKey> = eligible.iter().map(|unit| builder.key_for(unit)).collect();

    let capacities = capacity_table(&keys);
    let effective_total = plan.target_n.min(eligible.len());
    let quotas = allocate_quotas(effective_total, &capacities, plan.min_per_stratum);
    debug!(
        strata = capacities.len(),
        effective_total,
        allocated = quotas.values().sum::<usize>(),
        "computed per-stratum quotas"
    );

    // Member row indices per stratum, in row order.
    let mut members: HashMap<&StratumKey, Vec<usize>> = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        members.entry(key).or_default().push(row);
    }

    let mut rng = DeterministicRng::new(plan.seed);
    let mut selected_rows: Vec<usize> = Vec::with_capacity(effective_total);
    let mut selected_ids: HashSet<&str> = HashSet::with_capacity(effective_total);

    for (key, quota) in &quotas {
        if *quota == 0 {
            continue;
        }
        let Some(rows) = members.get(key) else {
            continue;
        };
        let amount = (*quota).min(rows.len());
        let mut child = DeterministicRng::new(rng.subseed());
        for picked in rand::seq::index::sample(&mut child, rows.len(), amount) {
            let row = rows[picked];
            selected_rows.push(row);
            if let Some(id) = eligible[row].field(&plan.id_column) {
                selected_ids.insert(id);
            }
        }
    }

    // Some strata may have run out of quota headroom; refill from the rest of
    // the population to reach the requested size. Proportions are not
    // re-balanced here, only the overall size.
    if selected_rows.len() < effective_total {
        let need = effective_total - selected_rows.len();
        let pool: Vec<usize> = (0..eligible.len())
            .filter(|&row| {
                eligible[row]
                    .field(&plan.id_column)
                    .is_some_and(|id| !selected_ids.contains(id))
            })
            .collect();
        let amount = need.min(pool.len());
        debug!(need, pool = pool.len(), "topping up from the remaining pool");
        let mut child = DeterministicRng::new(rng.subseed());
        for picked in rand::seq::index::sample(&mut child, pool.len(), amount) {
            let row = pool[picked];
            selected_rows.push(row);
            if let Some(id) = eligible[row].field(&plan.id_column) {
                selected_ids.insert(id);
            }
        }
    }

    Ok(selected_rows
        .into_iter()
        .map(|row| eligible[row].clone())
        .collect())
}

/// Count units per stratum key, then order the table capacity-descending with
/// key order as the tie-break so every later stage iterates deterministically.
fn capacity_table(keys: &[StratumKey]) -> IndexMap<StratumKey, usize> {
    let mut capacities: IndexMap<StratumKey, usize> = IndexMap::new();
    for key in keys {
        *capacities.entry(key.clone()).or_insert(0) += 1;
    }
    capacities.sort_by(|key_a, count_a, key_b, count_b| {
        count_b.cmp(count_a).then_with(|| key_a.cmp(key_b))
    });
    capacities
}

fn warn_on_duplicate_ids(eligible: &[&Unit], id_column: &str) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(eligible.len());
    let mut duplicates = 0usize;
    for unit in eligible {
        if let Some(id) = unit.field(id_column)
            && !seen.insert(id)
        {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warn!(
            duplicates,
            id_column, "input contains duplicate non-null ids; selection counts them once"
        );
    }
}

use std::collections::HashSet;

use indexmap::IndexMap;

use strata::{
    SamplePlan, SamplerError, StratumKey, StratumKeyBuilder, Unit, UnitTable, allocate_quotas,
    normalize_value, stratified_sample,
};

fn key(name: &str) -> StratumKey {
    StratumKey::from_parts(vec![name.to_string()])
}

fn caps(entries: &[(&str, usize)]) -> IndexMap<StratumKey, usize> {
    entries
        .iter()
        .map(|(name, capacity)| (key(name), *capacity))
        .collect()
}

fn unit(id: Option<&str>, country: &str, format: &str) -> Unit {
    let fields: IndexMap<String, Option<String>> = [
        ("Store_ID".to_string(), id.map(str::to_string)),
        ("Country".to_string(), Some(country.to_string())),
        ("Store_Format".to_string(), Some(format.to_string())),
    ]
    .into_iter()
    .collect();
    Unit::new(fields)
}

fn table(units: Vec<Unit>) -> UnitTable {
    UnitTable::new(
        vec![
            "Store_ID".to_string(),
            "Country".to_string(),
            "Store_Format".to_string(),
        ],
        units,
    )
}

fn plan(target_n: usize, seed: u64, min_per_stratum: usize) -> SamplePlan {
    SamplePlan {
        id_column: "Store_ID".to_string(),
        strat_columns: vec!["Country".to_string(), "Store_Format".to_string()],
        target_n,
        seed,
        min_per_stratum,
    }
}

fn population(strata: &[(&str, &str, usize)]) -> UnitTable {
    let mut units = Vec::new();
    let mut serial = 0usize;
    for (country, format, size) in strata {
        for _ in 0..*size {
            units.push(unit(Some(&format!("U{serial:04}")), country, format));
            serial += 1;
        }
    }
    table(units)
}

fn selected_ids(selection: &[Unit]) -> Vec<String> {
    let mut ids: Vec<String> = selection
        .iter()
        .map(|unit| unit.field("Store_ID").expect("selected unit has id").to_string())
        .collect();
    ids.sort();
    ids
}

// ---- allocator properties ----------------------------------------------------

#[test]
fn quota_capacity_and_budget_bounds_hold_over_a_grid() {
    let shapes: &[&[(&str, usize)]] = &[
        &[("A", 10), ("B", 10), ("C", 10)],
        &[("A", 1), ("B", 1), ("C", 1), ("D", 1), ("E", 1)],
        &[("A", 100), ("B", 5)],
        &[("A", 37), ("B", 2), ("C", 19), ("D", 1), ("E", 8)],
        &[("A", 1)],
        &[],
    ];
    for shape in shapes {
        let capacities = caps(shape);
        let population: usize = capacities.values().sum();
        for total in [0usize, 1, 3, 9, 20, 55, 200] {
            for min_per_stratum in [0usize, 1, 2, 4] {
                let quotas = allocate_quotas(total, &capacities, min_per_stratum);
                let mut allocated = 0usize;
                for (stratum, quota) in &quotas {
                    assert!(*quota <= capacities[stratum]);
                    allocated += quota;
                }
                assert!(allocated <= total);
                assert!(allocated <= population);
            }
        }
    }
}

#[test]
fn quota_minimum_guarantee_holds_when_feasible() {
    let shapes: &[&[(&str, usize)]] = &[
        &[("A", 10), ("B", 10), ("C", 10)],
        &[("A", 30), ("B", 4), ("C", 12)],
        &[("A", 2), ("B", 2)],
    ];
    for shape in shapes {
        let capacities = caps(shape);
        for min_per_stratum in [1usize, 2] {
            if capacities.values().any(|&capacity| capacity < min_per_stratum) {
                continue;
            }
            let total = capacities.len() * min_per_stratum + 3;
            let quotas = allocate_quotas(total, &capacities, min_per_stratum);
            assert!(
                quotas.values().all(|&quota| quota >= min_per_stratum),
                "minimum {min_per_stratum} violated for {shape:?}"
            );
        }
    }
}

#[test]
fn quota_scenario_proportional_floor() {
    // Spec fixture: {A:100, B:5}, total 20, min 2.
    let quotas = allocate_quotas(20, &caps(&[("A", 100), ("B", 5)]), 2);
    assert_eq!(quotas.values().sum::<usize>(), 20);
    assert!(quotas[&key("B")] >= 2 && quotas[&key("B")] <= 5);
}

#[test]
fn quota_scenario_singleton_strata_under_budget() {
    let quotas = allocate_quotas(3, &caps(&[("A", 1), ("B", 1), ("C", 1), ("D", 1), ("E", 1)]), 1);
    assert_eq!(quotas.values().sum::<usize>(), 3);
    assert!(quotas.values().all(|&quota| quota <= 1));
}

#[test]
fn quota_allocation_is_deterministic() {
    let capacities = caps(&[("A", 9), ("B", 9), ("C", 4), ("D", 4)]);
    let first = allocate_quotas(11, &capacities, 1);
    let second = allocate_quotas(11, &capacities, 1);
    assert_eq!(first, second);
}

// ---- key normalization -------------------------------------------------------

#[test]
fn normalization_is_idempotent_and_total() {
    for raw in [
        Some("  Hypermarket "),
        Some("de"),
        Some("ALREADY UPPER"),
        Some(""),
        Some("   "),
        None,
    ] {
        let once = normalize_value(raw);
        assert_eq!(normalize_value(Some(&once)), once);
        assert!(!once.is_empty());
    }
}

#[test]
fn key_builder_groups_messy_variants_together() {
    let builder = StratumKeyBuilder::new(vec!["Country".to_string(), "Store_Format".to_string()]);
    let clean = builder.key_for(&unit(Some("1"), "DE", "HYPERMARKET"));
    let messy = builder.key_for(&unit(Some("2"), " de ", "hypermarket"));
    assert_eq!(clean, messy);
}

// ---- sampler properties ------------------------------------------------------

#[test]
fn selection_is_deterministic_for_a_fixed_seed() {
    let table = population(&[("DE", "HYPER", 25), ("FR", "SUPER", 25)]);
    let first = stratified_sample(&table, &plan(10, 42, 1)).expect("sample");
    let second = stratified_sample(&table, &plan(10, 42, 1)).expect("sample");
    assert_eq!(first.len(), 10);
    assert_eq!(selected_ids(&first), selected_ids(&second));
}

#[test]
fn selection_size_equals_clamped_target() {
    let table = population(&[("DE", "HYPER", 12), ("FR", "SUPER", 7), ("IT", "KIOSK", 3)]);
    for target in [0usize, 1, 5, 10, 22, 50] {
        let selection = stratified_sample(&table, &plan(target, 7, 1)).expect("sample");
        assert_eq!(selection.len(), target.min(22), "target {target}");
    }
}

#[test]
fn selection_never_repeats_an_identifier() {
    let table = population(&[("DE", "HYPER", 40), ("FR", "SUPER", 9), ("IT", "KIOSK", 1)]);
    for seed in [0u64, 1, 42, 99] {
        let selection = stratified_sample(&table, &plan(30, seed, 1)).expect("sample");
        let ids = selected_ids(&selection);
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "seed {seed}");
    }
}

#[test]
fn every_stratum_is_represented_when_budget_allows() {
    let table = population(&[("DE", "HYPER", 30), ("FR", "SUPER", 15), ("IT", "KIOSK", 5)]);
    let selection = stratified_sample(&table, &plan(10, 42, 1)).expect("sample");
    assert_eq!(selection.len(), 10);
    let builder =
        StratumKeyBuilder::new(vec!["Country".to_string(), "Store_Format".to_string()]);
    let covered: HashSet<StratumKey> = selection.iter().map(|unit| builder.key_for(unit)).collect();
    assert_eq!(covered.len(), 3);
}

#[test]
fn oversized_target_returns_the_whole_population() {
    let table = population(&[("DE", "HYPER", 4), ("FR", "SUPER", 2)]);
    let selection = stratified_sample(&table, &plan(1000, 5, 1)).expect("sample");
    assert_eq!(selection.len(), 6);
}

#[test]
fn units_with_missing_ids_never_appear() {
    let mut rows = population(&[("DE", "HYPER", 5)]).units;
    rows.push(unit(None, "DE", "HYPER"));
    rows.push(unit(None, "FR", "SUPER"));
    let table = table(rows);
    let selection = stratified_sample(&table, &plan(100, 3, 1)).expect("sample");
    assert_eq!(selection.len(), 5);
    assert!(selection.iter().all(|unit| unit.field("Store_ID").is_some()));
}

#[test]
fn many_tiny_strata_still_fill_the_target() {
    // 40 singleton strata, target 25: regime A plus top-up must land exactly.
    let strata: Vec<(String, String, usize)> = (0..40)
        .map(|idx| (format!("C{idx}"), "KIOSK".to_string(), 1usize))
        .collect();
    let borrowed: Vec<(&str, &str, usize)> = strata
        .iter()
        .map(|(country, format, size)| (country.as_str(), format.as_str(), *size))
        .collect();
    let table = population(&borrowed);
    let selection = stratified_sample(&table, &plan(25, 11, 1)).expect("sample");
    assert_eq!(selection.len(), 25);
    let ids = selected_ids(&selection);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), 25);
}

#[test]
fn high_minimum_with_small_strata_still_fills_the_target() {
    // One stratum saturates below its floor share; the proportional pass
    // shifts the rest of the budget to the larger stratum.
    let table = population(&[("DE", "HYPER", 2), ("FR", "SUPER", 50)]);
    let selection = stratified_sample(&table, &plan(20, 42, 5)).expect("sample");
    assert_eq!(selection.len(), 20);
}

#[test]
fn global_top_up_compensates_a_bounded_allocation() {
    // With min 3 the budget cannot cover the floor, and the bounded even-split
    // walk leaves quotas at 7 of 11 (saturated singletons burn walk steps).
    let capacities = caps(&[("A", 10), ("B", 1), ("C", 1), ("D", 1)]);
    let quotas = allocate_quotas(11, &capacities, 3);
    assert_eq!(quotas.values().sum::<usize>(), 7);

    // The sampler's top-up pass must restore the requested overall size.
    let table = population(&[
        ("A", "HYPER", 10),
        ("B", "HYPER", 1),
        ("C", "HYPER", 1),
        ("D", "HYPER", 1),
    ]);
    let selection = stratified_sample(&table, &plan(11, 42, 3)).expect("sample");
    assert_eq!(selection.len(), 11);
    let ids = selected_ids(&selection);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), 11);
}

#[test]
fn missing_id_column_fails_eagerly() {
    let table = population(&[("DE", "HYPER", 3)]);
    let mut bad = plan(2, 1, 1);
    bad.id_column = "Shop_ID".to_string();
    match stratified_sample(&table, &bad) {
        Err(SamplerError::MissingIdColumn(column)) => assert_eq!(column, "Shop_ID"),
        other => panic!("expected MissingIdColumn, got {other:?}"),
    }
}

#[test]
fn missing_strat_columns_fail_eagerly_with_names() {
    let table = population(&[("DE", "HYPER", 3)]);
    let mut bad = plan(2, 1, 1);
    bad.strat_columns = vec!["Country".to_string(), "Climate".to_string()];
    match stratified_sample(&table, &bad) {
        Err(SamplerError::MissingStratColumns(columns)) => assert_eq!(columns, ["Climate"]),
        other => panic!("expected MissingStratColumns, got {other:?}"),
    }
}

#[test]
fn empty_table_yields_empty_selection() {
    let table = table(Vec::new());
    let selection = stratified_sample(&table, &plan(10, 42, 1)).expect("sample");
    assert!(selection.is_empty());
}

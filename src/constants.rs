/// Constants used by stratum key normalization and display.
pub mod key {
    /// Sentinel substituted for missing or blank attribute values.
    pub const UNKNOWN_VALUE: &str = "UNKNOWN";
    /// Separator used when rendering a key for logs and summaries.
    pub const KEY_DISPLAY_SEPARATOR: &str = " | ";
}

/// Constants used by quota allocation.
pub mod allocator {
    /// Number of full round-robin passes allowed when distributing leftover
    /// budget. Bounds the walk at `ROUND_ROBIN_PASSES * keys` steps so the
    /// loop terminates even when every key is capacity-saturated.
    pub const ROUND_ROBIN_PASSES: usize = 2;
}

/// Constants used by the stratified sampler runtime.
pub mod sampler {
    /// Exclusive upper bound for child-stream sub-seeds drawn from the parent RNG.
    pub const SUBSEED_BOUND: u64 = 1_000_000;
}

/// Default values for the CLI surface.
pub mod cli {
    /// Default unique-identifier column.
    pub const DEFAULT_ID_COLUMN: &str = "Store_ID";
    /// Default stratification columns, in key order.
    pub const DEFAULT_STRAT_COLUMNS: [&str; 5] =
        ["Country", "Region", "Store_Format", "Store_Type", "Category"];
    /// Default RNG seed.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default minimum units to aim for per non-empty stratum.
    pub const DEFAULT_MIN_PER_STRATUM: usize = 1;
}

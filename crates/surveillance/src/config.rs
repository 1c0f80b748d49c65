/// Durable record holding the region tree.
pub const REGION_TREE_KEY: &str = "region_tree";
/// Durable record holding water-quality samples.
pub const WATER_QUALITY_KEY: &str = "water_quality_reports";
/// Durable record holding awareness campaigns.
pub const CAMPAIGNS_KEY: &str = "campaigns";

/// Seed for the ChaCha RNG that generates the default case counts.
pub const DEFAULT_SEED: u64 = 0x4A41_4C57;

/// Region whose districts carry subdivisions and blocks.
pub const FULLY_MODELED_REGION_ID: &str = "AR";

/// Diseases every reporting level is expected to track.
pub const REQUIRED_DISEASES: &[&str] = &["Diarrhea", "Cholera", "Typhoid", "Hepatitis A"];

/// Date stamped on seeded diseases.
pub const SEED_DATE: (i32, u32, u32) = (2023, 10, 25);

/// Prefix for ids minted for region-level aggregate diseases.
pub const AGGREGATE_ID_PREFIX: &str = "agg-";

/// Length of randomly minted record ids.
pub const MINTED_ID_LEN: usize = 9;

// Water safety thresholds used by the quality dashboard.
pub const SAFE_E_COLI_BELOW: f64 = 1.0;
pub const SAFE_TURBIDITY_BELOW_NTU: f64 = 5.0;
pub const SAFE_PH_MIN: f64 = 6.5;
pub const SAFE_PH_MAX: f64 = 8.5;

//! RePoE game-data export: download, indexed lookups and mod analysis for a
//! given item base.

pub mod analyzer;
pub mod data;
pub mod download;
pub mod errors;

pub use analyzer::{CraftingAnalyzer, ItemAnalysis, ModAnalysis, StatRange};
pub use data::{
    repoe_data_root, BaseDescription, BenchCostEntry, BenchOption, ModTier, RePoEData,
    SpawnWeightBreakdown, TierBreakdown, REPOE_DEFAULT_BRANCH,
};
pub use download::{download_repoe_data, remote_files, remote_url, RePoEDownload, DEFAULT_REMOTE_FILES, REPOE_REPOSITORY};
pub use errors::RePoEError;

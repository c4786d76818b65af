//! Craft of Exile simulator data: bundle download and cache, typed section
//! lookups, and plan steps enriched with the records they reference.

pub mod client;
pub mod dataset;
pub mod errors;
pub mod plan_builder;

pub use client::{CraftOfExileClient, DEFAULT_BUNDLE_URL, DEFAULT_TIMEOUT, FALLBACK_BUNDLE_URLS};
pub use dataset::{CraftOfExileDataset, Section};
pub use errors::CraftOfExileError;
pub use plan_builder::{CraftingPlanBuilder, BUNDLE_FILE_NAME};

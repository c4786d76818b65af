//! Curated Path of Exile crafting datasets and their keyword indices.
//!
//! Each dataset is a JSON document in the data directory (populated by
//! `poe-kb sync` or checked in by hand). Indices normalise both the query and
//! the candidate text with [`text::normalise`] before matching.

pub mod base;
pub mod bench;
pub mod bestiary;
pub mod bosses;
pub mod catalog;
pub mod currency;
pub mod errors;
pub mod essences;
pub mod fossils;
pub mod fundamentals;
pub mod harvest;
pub mod incursion;
pub mod loader;
pub mod methods;
pub mod text;
pub mod vendor;

pub use base::{KnowledgeBase, KnowledgeDomain};
pub use bench::{BenchCost, BenchIndex, BenchRecipe};
pub use bestiary::{BeastRequirement, BeastcraftRecipe, BestiaryIndex};
pub use bosses::{BossEncounter, BossIndex, BossSearch, MapBoss};
pub use catalog::{CraftDomain, Match, SearchCatalog, StaticCatalog};
pub use currency::{CurrencyIndex, CurrencyOption};
pub use errors::KnowledgeError;
pub use essences::{Essence, EssenceIndex, EssenceType};
pub use fossils::{Fossil, FossilIndex, FossilSearch, Resonator, TagWeight};
pub use fundamentals::{FundamentalsIndex, ItemFundamental};
pub use harvest::{HarvestCraft, HarvestIndex};
pub use incursion::{IncursionCraft, IncursionIndex};
pub use methods::{BetrayalBench, CraftingStrategy, MethodsIndex};
pub use vendor::{VendorIndex, VendorRecipe, VendorRecipePart};

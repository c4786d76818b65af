//! Model-facing crafting strategies: the typed plan schema, a normaliser for
//! loosely structured plan JSON and the prompt that asks for it.

pub mod normalizer;
pub mod prompt;
pub mod schema;

pub use normalizer::normalize_crafting_plan;
pub use prompt::build_crafting_prompt;
pub use schema::{BudgetTier, CraftingPlan, CraftingRoute, PlanStep, RiskLevel};

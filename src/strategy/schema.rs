//! Strongly typed crafting strategy returned to clients.
//!
//! Optional fields serialise as `null` so consumers always see the full
//! shape, even when the source plan omitted a field.

use serde::{Deserialize, Serialize};

/// How aggressive a crafting approach is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Relative resource investment of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Budget,
    Standard,
    Luxury,
}

impl BudgetTier {
    pub const ALL: [BudgetTier; 3] = [BudgetTier::Budget, BudgetTier::Standard, BudgetTier::Luxury];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "budget",
            BudgetTier::Standard => "standard",
            BudgetTier::Luxury => "luxury",
        }
    }
}

/// One actionable step. Tiers are only set when they differ from the plan's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub risk_notes: Option<String>,
    #[serde(default)]
    pub budget_tier: Option<BudgetTier>,
    #[serde(default)]
    pub budget_notes: Option<String>,
    /// Signals that tell the player when to stop.
    #[serde(default)]
    pub success_criteria: Option<String>,
    /// Sub-steps that can replace this step.
    #[serde(default)]
    pub alternatives: Vec<PlanStep>,
}

/// A cohesive alternative following its own risk and cost profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftingRoute {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub budget_tier: Option<BudgetTier>,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CraftingPlan {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub risk_criteria: Option<String>,
    #[serde(default)]
    pub budget_tier: Option<BudgetTier>,
    #[serde(default)]
    pub budget_criteria: Option<String>,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub alternative_routes: Vec<CraftingRoute>,
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_serialise_as_null() {
        let plan = CraftingPlan {
            title: Some("Boots".into()),
            risk_level: Some(RiskLevel::Medium),
            ..Default::default()
        };
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["title"], "Boots");
        assert_eq!(value["risk_level"], "medium");
        assert!(value["goal"].is_null());
        assert_eq!(value["steps"], json!([]));
    }

    #[test]
    fn step_deserialises_with_defaults() {
        let step: PlanStep =
            serde_json::from_value(json!({"description": "Alt spam", "budget_tier": "luxury"}))
                .unwrap();
        assert_eq!(step.budget_tier, Some(BudgetTier::Luxury));
        assert!(step.alternatives.is_empty());
        assert_eq!(step.title, None);
    }
}

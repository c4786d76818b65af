//! Prompt template steering a model towards tiered, JSON-shaped plans that
//! [`normalize_crafting_plan`](super::normalize_crafting_plan) can read.

use super::schema::{BudgetTier, RiskLevel};

fn risk_names() -> String {
    RiskLevel::ALL.iter().map(RiskLevel::as_str).collect::<Vec<_>>().join(", ")
}

fn budget_names() -> String {
    BudgetTier::ALL.iter().map(BudgetTier::as_str).collect::<Vec<_>>().join(", ")
}

fn tier_guidance() -> String {
    [
        "When outlining strategies, enumerate distinct routes for the following tiers:".to_string(),
        format!("- Risk tiers: {}. Clarify the trade-offs that justify each tier.", risk_names()),
        format!(
            "- Budget tiers: {}. State the resource assumptions (currency, fossils, etc.).",
            budget_names()
        ),
        "If a tier is not viable for the goal, state it explicitly with a brief reason.".to_string(),
        "For each route provide the success criteria that indicate when to stop.".to_string(),
        "Nest alternative steps under `alternatives` when a different action can replace a step."
            .to_string(),
    ]
    .join("\n")
}

fn json_contract() -> String {
    format!(
        r#"Respond with JSON matching this structure:
{{
  "title": string,
  "goal": string,
  "overview": string,
  "risk_level": one of [{risk}],
  "risk_criteria": string explaining why the plan fits the tier,
  "budget_tier": one of [{budget}],
  "budget_criteria": string explaining the cost assumptions,
  "steps": [
    {{
      "title": string,
      "description": string,
      "risk_level": optional risk tier,
      "risk_notes": optional string,
      "budget_tier": optional budget tier,
      "budget_notes": optional string,
      "success_criteria": optional string,
      "alternatives": [CraftingStep, ...]
    }}
  ],
  "alternative_routes": [
    {{
      "name": string,
      "summary": string,
      "risk_level": risk tier,
      "budget_tier": budget tier,
      "steps": [CraftingStep, ...]
    }}
  ]
}}"#,
        risk = risk_names(),
        budget = budget_names(),
    )
}

/// Build the strategist prompt for `goal`, with optional free-form context
/// (e.g. a description of the item in hand).
pub fn build_crafting_prompt(goal: &str, context: Option<&str>) -> String {
    let context_block = match context {
        Some(text) if !text.is_empty() => format!("Context: {}\n", text.trim()),
        _ => String::new(),
    };

    [
        "You are an expert Path of Exile crafting strategist.".to_string(),
        context_block,
        format!("Goal: {}", goal.trim()),
        tier_guidance(),
        json_contract(),
        "Ensure each tiered route has explicit risk and budget rationales.".to_string(),
    ]
    .join("\n")
}

// ─── Tests ──────────────────────────────────────────────────────────────────

//! Normalise loosely structured plan JSON (typically model output) into a
//! [`CraftingPlan`].
//!
//! Model output drifts: keys get renamed, single objects appear where lists
//! are expected, tiers arrive as `"Medium-Risk"` or `{"level": "high"}`. The
//! normaliser accepts all of these and never fails; anything it cannot read
//! becomes `None` or is dropped.

use serde_json::{Map, Value};

use super::schema::{BudgetTier, CraftingPlan, CraftingRoute, PlanStep, RiskLevel};

const DEFAULT_STEP_DESCRIPTION: &str = "Refer to the route summary for guidance.";

/// Keys probed, in order, when a tier arrives as an object.
const ENUM_OBJECT_KEYS: &[&str] = &["value", "tier", "level", "name", "id"];

// ─── Value Helpers ──────────────────────────────────────────────────────────

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// First truthy value among `keys`.
fn first_of<'a>(data: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| data.get(*key))
        .find(|value| is_truthy(value))
}

fn text_of(data: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first_of(data, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Objects become a one-element list, arrays keep their object entries.
fn object_list<'a>(value: Option<&'a Value>) -> Vec<&'a Map<String, Value>> {
    match value {
        Some(Value::Object(map)) => vec![map],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// `" Medium-Risk "` → `"medium_risk"`.
fn enum_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

fn enum_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(map) => ENUM_OBJECT_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(enum_text),
        Value::String(s) => Some(enum_key(s)),
        other => Some(enum_key(&other.to_string())),
    }
}

fn risk_level(value: Option<&Value>) -> Option<RiskLevel> {
    let key = enum_text(value?)?;
    RiskLevel::ALL.into_iter().find(|level| level.as_str() == key)
}

fn budget_tier(value: Option<&Value>) -> Option<BudgetTier> {
    let key = enum_text(value?)?;
    BudgetTier::ALL.into_iter().find(|tier| tier.as_str() == key)
}

// ─── Coercion ───────────────────────────────────────────────────────────────

fn coerce_step(data: &Map<String, Value>) -> PlanStep {
    let description = text_of(data, &["description", "text"])
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_STEP_DESCRIPTION.to_string());

    PlanStep {
        title: text_of(data, &["title", "name"]),
        description,
        risk_level: risk_level(data.get("risk_level")),
        risk_notes: text_of(data, &["risk_notes", "risk_explanation"]),
        budget_tier: budget_tier(data.get("budget_tier")),
        budget_notes: text_of(data, &["budget_notes", "budget_explanation"]),
        success_criteria: text_of(data, &["success_criteria", "success", "stop_condition"]),
        alternatives: object_list(first_of(data, &["alternatives", "alternative_steps"]))
            .into_iter()
            .map(coerce_step)
            .collect(),
    }
}

fn coerce_route(data: &Map<String, Value>) -> CraftingRoute {
    CraftingRoute {
        name: text_of(data, &["name", "title"]),
        summary: text_of(data, &["summary", "description"]),
        risk_level: risk_level(data.get("risk_level")),
        budget_tier: budget_tier(data.get("budget_tier")),
        steps: object_list(first_of(data, &["steps", "plan"]))
            .into_iter()
            .map(coerce_step)
            .collect(),
    }
}

/// Normalise arbitrary plan JSON. A nested `"plan"` object is unwrapped;
/// non-object input yields an empty plan.
pub fn normalize_crafting_plan(raw: &Value) -> CraftingPlan {
    let empty = Map::new();
    let data = match raw {
        Value::Object(map) => match map.get("plan") {
            Some(Value::Object(inner)) => inner,
            _ => map,
        },
        _ => &empty,
    };

    let plan = CraftingPlan {
        title: text_of(data, &["title", "name"]),
        goal: text_of(data, &["goal", "item_goal"]),
        overview: text_of(data, &["overview", "summary"]),
        risk_level: risk_level(data.get("risk_level")),
        risk_criteria: text_of(data, &["risk_criteria", "risk_notes"]),
        budget_tier: budget_tier(data.get("budget_tier")),
        budget_criteria: text_of(data, &["budget_criteria", "budget_notes"]),
        steps: object_list(first_of(data, &["steps", "primary_steps"]))
            .into_iter()
            .map(coerce_step)
            .collect(),
        alternative_routes: object_list(first_of(data, &["alternative_routes", "routes"]))
            .into_iter()
            .map(coerce_route)
            .collect(),
    };

    tracing::debug!(
        steps = plan.steps.len(),
        routes = plan.alternative_routes.len(),
        "normalised crafting plan"
    );
    plan
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn unwraps_plan_and_resolves_aliases() {
        let raw = json!({
            "plan": {
                "name": "Tailwind boots",
                "item_goal": "Two-Toned Boots with tailwind",
                "summary": "Essence then bench.",
                "risk_level": "Medium",
                "risk_notes": "Harvest reforge may brick.",
                "budget_tier": {"tier": "LUXURY"},
                "primary_steps": [
                    {"name": "Essence", "text": "  Spam Essence of Hatred  ", "success": "T1 cold res"},
                    "not a step",
                    {"description": "", "alternative_steps": {"text": "Use fossils"}}
                ],
                "routes": {"title": "Cheap", "description": "Alts", "plan": [{"text": "Alt spam"}]}
            }
        });
        let plan = normalize_crafting_plan(&raw);

        assert_eq!(plan.title.as_deref(), Some("Tailwind boots"));
        assert_eq!(plan.goal.as_deref(), Some("Two-Toned Boots with tailwind"));
        assert_eq!(plan.overview.as_deref(), Some("Essence then bench."));
        assert_eq!(plan.risk_level, Some(RiskLevel::Medium));
        assert_eq!(plan.risk_criteria.as_deref(), Some("Harvest reforge may brick."));
        assert_eq!(plan.budget_tier, Some(BudgetTier::Luxury));

        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].title.as_deref(), Some("Essence"));
        assert_eq!(plan.steps[0].description, "Spam Essence of Hatred");
        assert_eq!(plan.steps[0].success_criteria.as_deref(), Some("T1 cold res"));
        assert_eq!(plan.steps[1].description, DEFAULT_STEP_DESCRIPTION);
        assert_eq!(plan.steps[1].alternatives[0].description, "Use fossils");

        assert_eq!(plan.alternative_routes.len(), 1);
        let route = &plan.alternative_routes[0];
        assert_eq!(route.name.as_deref(), Some("Cheap"));
        assert_eq!(route.summary.as_deref(), Some("Alts"));
        assert_eq!(route.steps[0].description, "Alt spam");
    }

    #[test]
    fn canonical_keys_win_over_aliases() {
        let plan = normalize_crafting_plan(&json!({
            "title": "Primary",
            "name": "Alias",
            "steps": [{"description": "a"}],
            "primary_steps": [{"description": "b"}, {"description": "c"}]
        }));
        assert_eq!(plan.title.as_deref(), Some("Primary"));
        assert_eq!(plan.steps.len(), 1);
    }

    #[test]
    fn empty_canonical_value_falls_through_to_alias() {
        let plan = normalize_crafting_plan(&json!({"title": "", "name": "Fallback", "steps": []}));
        assert_eq!(plan.title.as_deref(), Some("Fallback"));
        assert!(plan.steps.is_empty());
    }

    #[test]
    fn enum_coercion_accepts_loose_spellings() {
        assert_eq!(risk_level(Some(&json!(" HIGH "))), Some(RiskLevel::High));
        assert_eq!(risk_level(Some(&json!({"value": {"level": "low"}}))), Some(RiskLevel::Low));
        assert_eq!(budget_tier(Some(&json!("Standard"))), Some(BudgetTier::Standard));
        assert_eq!(budget_tier(Some(&json!("cheap"))), None);
        assert_eq!(risk_level(Some(&json!(2))), None);
        assert_eq!(risk_level(Some(&json!({"other": "low"}))), None);
        assert_eq!(risk_level(Some(&Value::Null)), None);
        assert_eq!(enum_key(" Medium-Risk_  tier "), "medium_risk_tier");
    }

    #[test]
    fn non_object_input_yields_empty_plan() {
        assert_eq!(normalize_crafting_plan(&json!(["steps"])), CraftingPlan::default());
        assert_eq!(normalize_crafting_plan(&json!({"plan": "text"})), CraftingPlan::default());
    }
}

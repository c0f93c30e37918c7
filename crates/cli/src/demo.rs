//! Deterministic in-process fixtures: a scripted transport and demo tool
//! executors. These back the `smoke` command and double as reusable fakes
//! for exercising the controller without a live model.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};

use fabquote_agent::{ConversationTurn, LlmTransport, ModelResponse, ToolExecutor};
use fabquote_core::{CapabilityDescriptor, ToolKind};

/// Replays a fixed response script; the fallback response repeats once the
/// script runs dry.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<ModelResponse>>,
    fallback: ModelResponse,
}

impl ScriptedTransport {
    pub fn new(script: Vec<ModelResponse>, fallback: ModelResponse) -> Self {
        Self { script: Mutex::new(script.into()), fallback }
    }
}

#[async_trait]
impl LlmTransport for ScriptedTransport {
    async fn send(
        &self,
        _turns: &[ConversationTurn],
        _capabilities: &[CapabilityDescriptor],
    ) -> Result<ModelResponse> {
        let mut script = self.script.lock().expect("scripted transport mutex poisoned");
        Ok(script.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Canned catalog, pricing, supplier, and nesting fixtures. Every result is
/// deterministic so smoke checks can assert on outcomes.
#[derive(Clone, Copy, Debug, Default)]
pub struct DemoToolExecutor;

#[async_trait]
impl ToolExecutor for DemoToolExecutor {
    async fn execute(&self, tool: ToolKind, arguments: &Map<String, Value>) -> Result<String> {
        match tool {
            ToolKind::MaterialSearch => material_search(arguments),
            ToolKind::PricingLookup => pricing_lookup(arguments),
            ToolKind::SupplierComparison => supplier_comparison(arguments),
            ToolKind::SheetNesting => sheet_nesting(arguments),
        }
    }
}

const CATALOG: &[(&str, &str)] = &[
    ("304 stainless sheet 2400x1200x1.6mm", "in stock (14 sheets)"),
    ("316 stainless sheet 2400x1200x3mm", "lead time 4 days"),
    ("AL-5052 sheet 2400x1200x3mm", "in stock (22 sheets)"),
    ("Mild steel plate 2400x1200x5mm", "in stock (8 plates)"),
];

fn material_search(arguments: &Map<String, Value>) -> Result<String> {
    let query = string_arg(arguments, "query")?;
    let needle = query.to_ascii_lowercase();

    let matches: Vec<String> = CATALOG
        .iter()
        .filter(|(name, _)| {
            let name = name.to_ascii_lowercase();
            needle.split_whitespace().any(|word| name.contains(word))
        })
        .map(|(name, availability)| format!("{name} - {availability}"))
        .collect();

    if matches.is_empty() {
        Ok(format!("no catalog matches for `{query}`"))
    } else {
        Ok(matches.join("\n"))
    }
}

fn pricing_lookup(arguments: &Map<String, Value>) -> Result<String> {
    let material = string_arg(arguments, "material")?;
    let quantity = arguments.get("quantity").and_then(Value::as_f64).unwrap_or(1.0);

    let list_price =
        price_for(&material).ok_or_else(|| anyhow!("no pricing on file for `{material}`"))?;

    // 5% break at 10+ units, half-up to the cent.
    let unit_price = if quantity >= 10.0 {
        (list_price * Decimal::new(95, 2))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    } else {
        list_price
    };

    Ok(format!("{material}: {unit_price} AUD per sheet (qty {quantity})"))
}

fn price_for(material: &str) -> Option<Decimal> {
    let needle = material.to_ascii_lowercase();
    if needle.contains("304") {
        Some(Decimal::new(18750, 2))
    } else if needle.contains("316") {
        Some(Decimal::new(26400, 2))
    } else if needle.contains("5052") || needle.contains("aluminium") {
        Some(Decimal::new(11250, 2))
    } else if needle.contains("mild steel") {
        Some(Decimal::new(9800, 2))
    } else {
        None
    }
}

fn supplier_comparison(arguments: &Map<String, Value>) -> Result<String> {
    let material = string_arg(arguments, "material")?;
    let list_price =
        price_for(&material).ok_or_else(|| anyhow!("no supplier data for `{material}`"))?;

    let midway = list_price.round_dp(2);
    let southern = (list_price * Decimal::new(104, 2)).round_dp(2);
    let coastal = (list_price * Decimal::new(98, 2)).round_dp(2);

    Ok(format!(
        "{material}:\n\
         - Midway Metals: {midway} AUD, 2 day lead, MOQ 1\n\
         - Southern Steel: {southern} AUD, next day, MOQ 5\n\
         - Coastal Alloys: {coastal} AUD, 6 day lead, MOQ 1"
    ))
}

fn sheet_nesting(arguments: &Map<String, Value>) -> Result<String> {
    let part_width = number_arg(arguments, "part_width_mm")?;
    let part_height = number_arg(arguments, "part_height_mm")?;
    let quantity = arguments
        .get("quantity")
        .and_then(Value::as_u64)
        .ok_or_else(|| anyhow!("sheet_nesting requires an integer `quantity`"))?;

    let sheet_width = arguments.get("sheet_width_mm").and_then(Value::as_f64).unwrap_or(2400.0);
    let sheet_height = arguments.get("sheet_height_mm").and_then(Value::as_f64).unwrap_or(1200.0);
    let kerf = arguments.get("kerf_mm").and_then(Value::as_f64).unwrap_or(2.0);

    if part_width <= 0.0 || part_height <= 0.0 {
        bail!("part dimensions must be positive");
    }
    if quantity == 0 {
        bail!("quantity must be at least 1");
    }

    let across = ((sheet_width + kerf) / (part_width + kerf)).floor() as u64;
    let down = ((sheet_height + kerf) / (part_height + kerf)).floor() as u64;
    let per_sheet = across * down;
    if per_sheet == 0 {
        bail!(
            "part {part_width}x{part_height}mm does not fit a {sheet_width}x{sheet_height}mm sheet"
        );
    }

    let sheets = quantity.div_ceil(per_sheet);
    let yield_pct = (quantity as f64 * part_width * part_height)
        / (sheets as f64 * sheet_width * sheet_height)
        * 100.0;

    Ok(format!(
        "{quantity} parts at {part_width}x{part_height}mm: {per_sheet} per sheet, \
         {sheets} sheet(s) required, {yield_pct:.1}% yield"
    ))
}

fn string_arg(arguments: &Map<String, Value>, key: &str) -> Result<String> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("missing required string argument `{key}`"))
}

fn number_arg(arguments: &Map<String, Value>, key: &str) -> Result<f64> {
    arguments
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| anyhow!("missing required numeric argument `{key}`"))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use fabquote_agent::ToolExecutor;
    use fabquote_core::ToolKind;

    use super::DemoToolExecutor;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn nesting_math_is_deterministic() {
        let executor = DemoToolExecutor;
        let result = executor
            .execute(
                ToolKind::SheetNesting,
                &args(json!({ "part_width_mm": 100, "part_height_mm": 50, "quantity": 40 })),
            )
            .await
            .expect("nesting succeeds");

        // 23 across, 23 down on a 2400x1200 sheet with 2mm kerf.
        assert!(result.contains("1 sheet(s) required"));
        assert!(result.contains("40 parts"));
    }

    #[tokio::test]
    async fn oversized_part_is_an_error() {
        let executor = DemoToolExecutor;
        let error = executor
            .execute(
                ToolKind::SheetNesting,
                &args(json!({ "part_width_mm": 3000, "part_height_mm": 50, "quantity": 1 })),
            )
            .await
            .expect_err("oversized part must fail");

        assert!(error.to_string().contains("does not fit"));
    }

    #[tokio::test]
    async fn quantity_break_reduces_unit_price() {
        let executor = DemoToolExecutor;
        let list = executor
            .execute(
                ToolKind::PricingLookup,
                &args(json!({ "material": "304 stainless", "quantity": 1 })),
            )
            .await
            .expect("pricing succeeds");
        let broken = executor
            .execute(
                ToolKind::PricingLookup,
                &args(json!({ "material": "304 stainless", "quantity": 12 })),
            )
            .await
            .expect("pricing succeeds");

        assert!(list.contains("187.50"));
        assert!(broken.contains("178.13"));
    }

    #[tokio::test]
    async fn unknown_material_pricing_fails() {
        let executor = DemoToolExecutor;
        let error = executor
            .execute(ToolKind::PricingLookup, &args(json!({ "material": "unobtainium" })))
            .await
            .expect_err("unknown material must fail");

        assert!(error.to_string().contains("no pricing on file"));
    }

    #[tokio::test]
    async fn material_search_filters_the_catalog() {
        let executor = DemoToolExecutor;
        let result = executor
            .execute(ToolKind::MaterialSearch, &args(json!({ "query": "304" })))
            .await
            .expect("search succeeds");

        assert!(result.contains("304 stainless sheet"));
        assert!(!result.contains("Mild steel"));
    }
}

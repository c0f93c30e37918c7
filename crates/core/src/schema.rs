//! Schema registry: the single source of truth for what each mode must emit
//! and which intermediate capabilities it may use.

use std::sync::OnceLock;

use serde_json::{json, Value};

use crate::capability::ToolKind;
use crate::mode::QuoteMode;

/// Upper bound on the `questions` escape hatch carried by every schema.
pub const MAX_QUESTIONS: u64 = 3;

/// Output schema for `mode`. The document is a JSON-Schema subset consumed by
/// the validator, the prompt renderer, and the terminal capability descriptor.
pub fn output_schema(mode: QuoteMode) -> &'static Value {
    match mode {
        QuoteMode::Calc => calc_schema(),
        QuoteMode::Price => price_schema(),
        QuoteMode::Table => table_schema(),
    }
}

/// Intermediate capabilities a run in `mode` may invoke. The terminal emit
/// capability is appended by the gate, never listed here.
pub fn allowed_tools(mode: QuoteMode) -> &'static [ToolKind] {
    match mode {
        QuoteMode::Calc => &[ToolKind::MaterialSearch, ToolKind::SheetNesting],
        QuoteMode::Price => {
            &[ToolKind::MaterialSearch, ToolKind::PricingLookup, ToolKind::SupplierComparison]
        }
        QuoteMode::Table => {
            &[ToolKind::MaterialSearch, ToolKind::PricingLookup, ToolKind::SheetNesting]
        }
    }
}

fn calc_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "required": ["summary", "results", "assumptions", "questions"],
            "properties": {
                "summary": {
                    "type": "string",
                    "description": "One-paragraph plain-language answer to the calculation request"
                },
                "results": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["label", "value", "unit"],
                        "properties": {
                            "label": { "type": "string" },
                            "value": { "type": "number" },
                            "unit": { "type": "string" }
                        }
                    }
                },
                "assumptions": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "questions": questions_schema()
            }
        })
    })
}

fn price_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "required": ["materials", "currency", "subtotal", "questions"],
            "properties": {
                "materials": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["description", "quantity", "unit", "unit_price", "line_total"],
                        "properties": {
                            "description": { "type": "string" },
                            "quantity": { "type": "number" },
                            "unit": { "type": "string" },
                            "unit_price": { "type": "number" },
                            "line_total": { "type": "number" },
                            "supplier": { "type": "string" },
                            "sku": { "type": "string" }
                        }
                    }
                },
                "currency": { "type": "string" },
                "subtotal": { "type": "number" },
                "questions": questions_schema()
            }
        })
    })
}

fn table_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "required": ["lines", "subtotal", "tax", "total", "questions"],
            "properties": {
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["item", "description", "quantity", "unit_price", "line_total"],
                        "properties": {
                            "item": { "type": "string" },
                            "description": { "type": "string" },
                            "quantity": { "type": "number" },
                            "unit_price": { "type": "number" },
                            "line_total": { "type": "number" }
                        }
                    }
                },
                "subtotal": { "type": "number" },
                "tax": { "type": "number" },
                "total": { "type": "number" },
                "notes": { "type": "string" },
                "questions": questions_schema()
            }
        })
    })
}

fn questions_schema() -> Value {
    json!({
        "type": "array",
        "maxItems": MAX_QUESTIONS,
        "items": { "type": "string" },
        "description": "Questions for the estimator when information is missing; empty when the result is complete"
    })
}

#[cfg(test)]
mod tests {
    use super::{allowed_tools, output_schema};
    use crate::capability::ToolKind;
    use crate::mode::QuoteMode;

    #[test]
    fn every_schema_requires_the_questions_escape_hatch() {
        for mode in QuoteMode::ALL {
            let schema = output_schema(mode);
            let required = schema["required"].as_array().expect("required keys");
            assert!(
                required.iter().any(|key| key == "questions"),
                "{mode} schema must require `questions`"
            );
            assert_eq!(schema["properties"]["questions"]["maxItems"], 3);
        }
    }

    #[test]
    fn allowed_tools_never_cross_modes_incorrectly() {
        assert!(!allowed_tools(QuoteMode::Calc).contains(&ToolKind::PricingLookup));
        assert!(!allowed_tools(QuoteMode::Price).contains(&ToolKind::SheetNesting));
        assert!(!allowed_tools(QuoteMode::Table).contains(&ToolKind::SupplierComparison));
    }

    #[test]
    fn schema_documents_are_stable_across_lookups() {
        for mode in QuoteMode::ALL {
            assert!(std::ptr::eq(output_schema(mode), output_schema(mode)));
        }
    }
}

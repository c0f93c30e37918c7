use serde::Serialize;
use serde_json::{json, Value};

/// A capability the model may invoke during a run: a wire name, a human
/// description, and a JSON parameter schema.
///
/// Intermediate capabilities perform side-effect-free lookups and return a
/// string result; terminal capabilities (built by the gate) end the run.
#[derive(Clone, Debug, Serialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// The closed set of intermediate capabilities. Adding one is an enumeration
/// change checked by every `match` below, not a runtime registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    MaterialSearch,
    PricingLookup,
    SupplierComparison,
    SheetNesting,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] =
        [Self::MaterialSearch, Self::PricingLookup, Self::SupplierComparison, Self::SheetNesting];

    pub fn name(&self) -> &'static str {
        match self {
            Self::MaterialSearch => "material_search",
            Self::PricingLookup => "pricing_lookup",
            Self::SupplierComparison => "supplier_comparison",
            Self::SheetNesting => "sheet_nesting",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "material_search" => Some(Self::MaterialSearch),
            "pricing_lookup" => Some(Self::PricingLookup),
            "supplier_comparison" => Some(Self::SupplierComparison),
            "sheet_nesting" => Some(Self::SheetNesting),
            _ => None,
        }
    }

    pub fn descriptor(&self) -> CapabilityDescriptor {
        match self {
            Self::MaterialSearch => CapabilityDescriptor {
                name: self.name().to_string(),
                description: "Search the material catalog by free-text query. Returns matching \
                              materials with grade, form, and stock status."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Free-text material description, e.g. '304 stainless 1.6mm sheet'"
                        },
                        "category": {
                            "type": "string",
                            "description": "Optional catalog category filter, e.g. 'sheet', 'tube', 'plate'"
                        }
                    },
                    "required": ["query"]
                }),
            },
            Self::PricingLookup => CapabilityDescriptor {
                name: self.name().to_string(),
                description: "Look up current unit pricing for a material specification, \
                              optionally at a quantity break."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "material": {
                            "type": "string",
                            "description": "Material specification to price, e.g. 'AL-5052 2400x1200x3mm'"
                        },
                        "quantity": {
                            "type": "number",
                            "description": "Quantity for break pricing; omit for list price"
                        }
                    },
                    "required": ["material"]
                }),
            },
            Self::SupplierComparison => CapabilityDescriptor {
                name: self.name().to_string(),
                description: "Compare suppliers for a material: price, lead time, and minimum \
                              order quantity per supplier."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "material": {
                            "type": "string",
                            "description": "Material specification to compare across suppliers"
                        }
                    },
                    "required": ["material"]
                }),
            },
            Self::SheetNesting => CapabilityDescriptor {
                name: self.name().to_string(),
                description: "Calculate how many stock sheets are needed to cut a quantity of \
                              rectangular parts, including kerf allowance and yield."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "part_width_mm": { "type": "number" },
                        "part_height_mm": { "type": "number" },
                        "quantity": { "type": "integer" },
                        "sheet_width_mm": {
                            "type": "number",
                            "description": "Stock sheet width; defaults to 2400"
                        },
                        "sheet_height_mm": {
                            "type": "number",
                            "description": "Stock sheet height; defaults to 1200"
                        },
                        "kerf_mm": {
                            "type": "number",
                            "description": "Cut allowance between parts; defaults to 2"
                        }
                    },
                    "required": ["part_width_mm", "part_height_mm", "quantity"]
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ToolKind;

    #[test]
    fn names_round_trip_through_from_name() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        assert_eq!(ToolKind::from_name("emit_calc_result"), None);
        assert_eq!(ToolKind::from_name("drop_tables"), None);
    }

    #[test]
    fn descriptors_declare_required_parameters() {
        for kind in ToolKind::ALL {
            let descriptor = kind.descriptor();
            assert_eq!(descriptor.name, kind.name());
            assert!(!descriptor.description.is_empty());
            let required = descriptor.parameters["required"]
                .as_array()
                .unwrap_or_else(|| panic!("{} must declare required params", kind.name()));
            assert!(!required.is_empty());
        }
    }
}

//! Capability gate: the concrete invocable capability set for one run.
//!
//! The gate is what makes cross-mode rejection possible - the wrong terminal
//! name is simply never exposed to the model in the first place.

use fabquote_core::{allowed_tools, output_schema, CapabilityDescriptor, QuoteMode, ToolKind};

/// Full capability set for a run in `mode`: the registry's intermediate
/// capabilities resolved to descriptors, plus exactly one terminal emit
/// capability whose parameter schema is the mode's output schema.
pub fn capabilities_for(mode: QuoteMode) -> Vec<CapabilityDescriptor> {
    let mut capabilities: Vec<CapabilityDescriptor> =
        allowed_tools(mode).iter().map(ToolKind::descriptor).collect();
    capabilities.push(terminal_descriptor(mode));
    capabilities
}

/// Terminal capability descriptor for `mode`. Invoking it is the only
/// successful exit from the orchestration loop.
pub fn terminal_descriptor(mode: QuoteMode) -> CapabilityDescriptor {
    let description = match mode {
        QuoteMode::Calc => {
            "Emit the finished calculation result. Call exactly once, when the calculation is \
             complete or when you need answers to outstanding questions."
        }
        QuoteMode::Price => {
            "Emit the finished priced material list. Call exactly once, when pricing is complete \
             or when you need answers to outstanding questions."
        }
        QuoteMode::Table => {
            "Emit the finalized quote table. Call exactly once, when the table is complete or \
             when you need answers to outstanding questions."
        }
    };

    CapabilityDescriptor {
        name: mode.terminal_capability().to_string(),
        description: description.to_string(),
        parameters: output_schema(mode).clone(),
    }
}

#[cfg(test)]
mod tests {
    use fabquote_core::{allowed_tools, QuoteMode};

    use super::capabilities_for;

    #[test]
    fn exactly_one_terminal_capability_per_mode() {
        for mode in QuoteMode::ALL {
            let capabilities = capabilities_for(mode);
            let terminals: Vec<_> = capabilities
                .iter()
                .filter(|descriptor| descriptor.name.starts_with("emit_"))
                .collect();

            assert_eq!(terminals.len(), 1, "{mode} must expose exactly one terminal capability");
            assert_eq!(terminals[0].name, mode.terminal_capability());
        }
    }

    #[test]
    fn no_other_modes_terminal_name_appears() {
        for mode in QuoteMode::ALL {
            let capabilities = capabilities_for(mode);
            for other in QuoteMode::ALL.into_iter().filter(|other| *other != mode) {
                assert!(
                    !capabilities
                        .iter()
                        .any(|descriptor| descriptor.name == other.terminal_capability()),
                    "{mode} capability set must not expose {}",
                    other.terminal_capability()
                );
            }
        }
    }

    #[test]
    fn intermediate_descriptors_match_the_registry() {
        for mode in QuoteMode::ALL {
            let capabilities = capabilities_for(mode);
            assert_eq!(capabilities.len(), allowed_tools(mode).len() + 1);
            for kind in allowed_tools(mode) {
                assert!(capabilities.iter().any(|descriptor| descriptor.name == kind.name()));
            }
        }
    }

    #[test]
    fn terminal_parameters_are_the_output_schema() {
        for mode in QuoteMode::ALL {
            let terminal = super::terminal_descriptor(mode);
            assert_eq!(&terminal.parameters, fabquote_core::output_schema(mode));
        }
    }
}

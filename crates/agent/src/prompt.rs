//! Prompt renderer: the mode-specific instruction text for the first turn.
//!
//! Rendering is deterministic given identical inputs, which keeps golden
//! tests possible and transcript replay stable.

use serde_json::Value;
use tera::{Context, Tera};
use thiserror::Error;

use fabquote_core::{JobContext, QuoteMode};

const TEMPLATE_NAME: &str = "quote_mode_prompt";

const PROMPT_TEMPLATE: &str = r#"You are the estimating assistant for a metal fabrication workshop.

Finish by calling the `{{ emit_capability }}` capability with a payload matching the output schema below. Never answer with prose alone, and never call capabilities outside the provided set.

Output schema for `{{ emit_capability }}`:
{{ schema_json }}

{% if job is defined %}Job context:
- Job number: {{ job.job_number }}
- Client: {{ job.client_name }}
- Description: {{ job.description }}

{% endif %}Request:
{{ user_input }}

{{ task_sentence }} If required information is missing, call `{{ emit_capability }}` with up to three entries in `questions` and your best partial result in the other fields."#;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt template error: {0}")]
    Template(String),
}

pub struct PromptRenderer {
    tera: Tera,
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, PROMPT_TEMPLATE)
            .expect("embedded prompt template must parse");
        Self { tera }
    }

    /// Render the instruction text for one run: fixed framing, the serialized
    /// schema, optional job context, the raw user input, and the mode task
    /// sentence.
    pub fn render(
        &self,
        mode: QuoteMode,
        user_input: &str,
        job_context: Option<&JobContext>,
        schema: &Value,
    ) -> Result<String, PromptError> {
        let schema_json = serde_json::to_string_pretty(schema)
            .map_err(|error| PromptError::Template(error.to_string()))?;

        let mut context = Context::new();
        context.insert("emit_capability", mode.terminal_capability());
        context.insert("schema_json", &schema_json);
        context.insert("user_input", user_input);
        context.insert("task_sentence", task_sentence(mode));
        if let Some(job) = job_context {
            context.insert("job", job);
        }

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|error| PromptError::Template(error.to_string()))
    }
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn task_sentence(mode: QuoteMode) -> &'static str {
    match mode {
        QuoteMode::Calc => {
            "Work out the requested calculation (sheet counts, yield, areas, allowances) using \
             the available capabilities, then emit it."
        }
        QuoteMode::Price => {
            "Build a priced material list using the lookup capabilities, then emit it."
        }
        QuoteMode::Table => {
            "Assemble the finalized quote table with subtotal, tax, and total, then emit it."
        }
    }
}

#[cfg(test)]
mod tests {
    use fabquote_core::{output_schema, JobContext, QuoteMode};

    use super::PromptRenderer;

    #[test]
    fn rendering_is_deterministic() {
        let renderer = PromptRenderer::new();
        let job = JobContext::new("J-2412", "Harbour Marine", "Aluminium console brackets");

        let first = renderer
            .render(
                QuoteMode::Price,
                "price 4 sheets of 5052",
                Some(&job),
                output_schema(QuoteMode::Price),
            )
            .expect("render");
        let second = renderer
            .render(
                QuoteMode::Price,
                "price 4 sheets of 5052",
                Some(&job),
                output_schema(QuoteMode::Price),
            )
            .expect("render");

        assert_eq!(first, second);
    }

    #[test]
    fn prompt_embeds_schema_and_terminal_capability() {
        let renderer = PromptRenderer::new();
        let prompt = renderer
            .render(QuoteMode::Calc, "how many sheets?", None, output_schema(QuoteMode::Calc))
            .expect("render");

        assert!(prompt.contains("`emit_calc_result`"));
        assert!(prompt.contains("\"required\""));
        assert!(prompt.contains("\"questions\""));
        assert!(prompt.contains("how many sheets?"));
        assert!(!prompt.contains("emit_price_result"));
    }

    #[test]
    fn job_context_block_is_optional() {
        let renderer = PromptRenderer::new();
        let job = JobContext::new("J-1001", "Acme Fab", "Stair stringers");

        let with_job = renderer
            .render(QuoteMode::Table, "final table", Some(&job), output_schema(QuoteMode::Table))
            .expect("render");
        let without_job = renderer
            .render(QuoteMode::Table, "final table", None, output_schema(QuoteMode::Table))
            .expect("render");

        assert!(with_job.contains("Job number: J-1001"));
        assert!(with_job.contains("Acme Fab"));
        assert!(!without_job.contains("Job context:"));
    }
}

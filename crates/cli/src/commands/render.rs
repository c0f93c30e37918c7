use fabquote_agent::PromptRenderer;
use fabquote_core::{output_schema, JobContext, QuoteMode};

use crate::commands::CommandResult;

pub fn run(
    mode: &str,
    text: &str,
    job_number: Option<&str>,
    client: Option<&str>,
    description: Option<&str>,
) -> CommandResult {
    let mode = match mode.parse::<QuoteMode>() {
        Ok(mode) => mode,
        Err(error) => return CommandResult::failure("render", "unknown_mode", error.to_string(), 2),
    };

    // Job context only renders when all three fields are supplied; a partial
    // block would be misleading in the prompt.
    let job_context = match (job_number, client, description) {
        (Some(job_number), Some(client), Some(description)) => {
            Some(JobContext::new(job_number, client, description))
        }
        _ => None,
    };

    let renderer = PromptRenderer::new();
    match renderer.render(mode, text, job_context.as_ref(), output_schema(mode)) {
        Ok(prompt) => CommandResult { exit_code: 0, output: prompt },
        Err(error) => CommandResult::failure("render", "prompt_template", error.to_string(), 3),
    }
}

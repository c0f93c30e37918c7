pub mod commands;
pub mod demo;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "fabquote",
    about = "Fabquote quote-mode operator CLI",
    long_about = "Inspect and exercise the quote-mode controller: mode inference, schemas, \
                  capability gating, prompt rendering, config, and smoke validation.",
    after_help = "Examples:\n  fabquote infer \"price 4 sheets of 304 stainless\"\n  fabquote schema calc\n  fabquote capabilities price\n  fabquote smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Infer the operating mode for free-text input with advisory confidence")]
    Infer {
        text: String,
        #[arg(long, help = "Previous mode used as the zero-score fallback")]
        previous: Option<String>,
    },
    #[command(about = "Print the output schema a mode's terminal capability must satisfy")]
    Schema { mode: String },
    #[command(about = "Print the gated capability set for a mode")]
    Capabilities { mode: String },
    #[command(about = "Render the exact prompt text for a mode and input")]
    Render {
        mode: String,
        text: String,
        #[arg(long, help = "Job number for the job context block")]
        job_number: Option<String>,
        #[arg(long, help = "Client name for the job context block")]
        client: Option<String>,
        #[arg(long, help = "Job description for the job context block")]
        description: Option<String>,
    },
    #[command(
        about = "Run one orchestration against the configured model, using the demo tool executors"
    )]
    Quote {
        text: String,
        #[arg(long, help = "Operating mode; inferred from the text when omitted")]
        mode: Option<String>,
        #[arg(long, help = "Job number for the job context block")]
        job_number: Option<String>,
        #[arg(long, help = "Client name for the job context block")]
        client: Option<String>,
        #[arg(long, help = "Job description for the job context block")]
        description: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(
        about = "Run end-to-end orchestration checks against the in-process scripted transport"
    )]
    Smoke,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Infer { text, previous } => commands::infer::run(&text, previous.as_deref()),
        Command::Schema { mode } => commands::schema::run(&mode),
        Command::Capabilities { mode } => commands::capabilities::run(&mode),
        Command::Render { mode, text, job_number, client, description } => commands::render::run(
            &mode,
            &text,
            job_number.as_deref(),
            client.as_deref(),
            description.as_deref(),
        ),
        Command::Quote { text, mode, job_number, client, description } => commands::quote::run(
            &text,
            mode.as_deref(),
            job_number.as_deref(),
            client.as_deref(),
            description.as_deref(),
        ),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Smoke => commands::smoke::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

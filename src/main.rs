//! f2read - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use f2read::{
    cli::{Args, ConfigFile, EffectiveOptions},
    execution::{run, RunContext, RunReport},
    streaming::ChatClient,
    telemetry::init_tracing,
    ResponseMode,
};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    init_tracing(verbosity);
    tracing::debug!(verbosity = verbosity.as_str(), "Starting f2read");

    let working_dir = std::env::current_dir().context("Could not determine working directory")?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| ConfigFile::default_path(&working_dir));
    let config_file = ConfigFile::load(&config_path).await;
    let options = EffectiveOptions::resolve(&args.invocation_flags(), &config_file);

    let client = ChatClient::with_config(&options.base_url, &ChatClient::api_key_from_env())?;
    let ctx = RunContext::new(options, working_dir, verbosity.show_progress());

    let mut sink = std::io::stdout();

    match run(&ctx, &args.paths, &client, &mut sink).await {
        Ok(report) => {
            // console may already be gone; the file is written
            writeln!(sink).ok();
            finish(&ctx, &report);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn finish(ctx: &RunContext, report: &RunReport) {
    let options = ctx.options();

    if let Some(path) = &report.output_path {
        eprintln!("{} {}", "File written:".green(), path.display());
    }

    if !options.report_token_usage {
        return;
    }

    match (report.usage_report(), report.mode) {
        (Some(usage), _) => eprintln!("\n{}", usage),
        (None, ResponseMode::Streamed) => {
            tracing::warn!("Token usage is unavailable in streamed mode");
        }
        (None, ResponseMode::Buffered) => {
            tracing::warn!("The completion service did not report token usage");
        }
    }
}

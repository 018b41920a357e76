//! Command-line argument parsing for f2read
//!
//! Provides the clap-based CLI and its conversion into invocation flags.

use crate::cli::config::InvocationFlags;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// f2read - Generate a README from source files with a local LLM
#[derive(Parser, Debug)]
#[command(name = "f2read")]
#[command(version, disable_version_flag = true)]
#[command(
    about = "Creates a new README file based on the file path(s) passed",
    long_about = None
)]
pub struct Args {
    /// The path name(s) of the file(s) or folder(s) to be read
    #[arg(value_name = "PATHS", required = true, num_args = 1..)]
    pub paths: Vec<String>,

    /// Custom output file name instead of README.md
    #[arg(short, long)]
    pub output: Option<String>,

    /// Model to use for the prompt
    #[arg(short, long)]
    pub model: Option<String>,

    /// Stream output to the console as it is generated
    #[arg(short, long)]
    pub stream: bool,

    /// Print the number of tokens used
    #[arg(short = 't', long = "token-usage")]
    pub token_usage: bool,

    /// Configuration file path (default: ./F2READ-config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory bare file names and the output are resolved against
    #[arg(long)]
    pub source_root: Option<String>,

    /// Verbosity level: -q (quiet), default (normal), --verbose, --verbose --verbose
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Flags that were actually given; absent switches stay unset
    pub fn invocation_flags(&self) -> InvocationFlags {
        InvocationFlags {
            model: self.model.clone(),
            output: self.output.clone(),
            stream: self.stream.then_some(true),
            token_usage: self.token_usage.then_some(true),
            base_url: self.base_url.clone(),
            source_root: self.source_root.clone(),
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Default log filter for this level
    pub fn log_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }
}

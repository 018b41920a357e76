//! f2read - README generation from source files
//!
//! Reads the files and folders named on the command line, asks an
//! OpenAI-compatible model (a local Ollama server by default) to document
//! them, and writes the Markdown reply to disk.
//!
//! # Architecture
//!
//! - **cli**: argument parsing and layered configuration
//! - **input**: path resolution and content collection
//! - **prompt**: instruction template and prompt assembly
//! - **streaming** / **completion**: the chat-completion client and the
//!   buffered/streamed response handling
//! - **output**: writing the generated document
//! - **execution**: the pipeline tying the stages together

pub mod errors;

// Re-export commonly used types
pub use errors::{F2ReadError, Result};

pub mod cli;
pub mod completion;
pub mod execution;
pub mod input;
pub mod output;
pub mod prompt;
pub mod streaming;
pub mod telemetry;

pub use completion::{CompletionResult, ResponseMode, UsageStats};
pub use execution::{run, RunContext, RunReport};

//! CLI module for f2read
//!
//! Handles command-line argument parsing and configuration management.

pub mod args;
pub mod config;

pub use args::{Args, Verbosity};
pub use config::{ConfigFile, EffectiveOptions, InvocationFlags};

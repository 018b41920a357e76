//! Input handling
//!
//! Resolves command-line paths and collects the labeled file contents that
//! make up the prompt.

pub mod collector;
pub mod resolver;

pub use collector::{collect, LabeledContent};
pub use resolver::{anchor_for, Anchor, PathKind, PathResolver, ResolvedPath};

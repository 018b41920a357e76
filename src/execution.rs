//! End-to-end generation pipeline
//!
//! Resolve inputs, collect their contents, build the prompt, request the
//! completion and write the result. Every stage reads the same immutable
//! [`RunContext`]; any failure aborts the run before the output is written.

use crate::cli::config::EffectiveOptions;
use crate::completion::{complete, ResponseMode, UsageStats};
use crate::errors::Result;
use crate::input::{collect, LabeledContent, PathResolver, ResolvedPath};
use crate::output::write_output;
use crate::prompt::{build, Prompt};
use crate::streaming::client::CompletionBackend;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Per-invocation context threaded through every stage
#[derive(Debug, Clone)]
pub struct RunContext {
    options: EffectiveOptions,
    source_root: PathBuf,
    working_dir: PathBuf,
    show_progress: bool,
}

impl RunContext {
    /// Source root is `options.source_root` taken relative to `working_dir`
    pub fn new(options: EffectiveOptions, working_dir: impl Into<PathBuf>, show_progress: bool) -> Self {
        let working_dir = working_dir.into();
        let source_root = working_dir.join(&options.source_root);

        Self {
            options,
            source_root,
            working_dir,
            show_progress,
        }
    }

    pub fn options(&self) -> &EffectiveOptions {
        &self.options
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.source_root.clone(), self.working_dir.clone())
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: ResponseMode,
    /// `None` when the model returned no text
    pub output_path: Option<PathBuf>,
    pub usage: Option<UsageStats>,
    pub text: String,
}

impl RunReport {
    /// Printable token usage, if the service reported any
    pub fn usage_report(&self) -> Option<String> {
        self.usage.map(|usage| usage.to_string())
    }
}

/// Resolve every input before reading any of them
pub async fn resolve_inputs(ctx: &RunContext, inputs: &[String]) -> Result<Vec<ResolvedPath>> {
    let resolver = ctx.resolver();
    let mut resolved = Vec::with_capacity(inputs.len());

    for input in inputs {
        resolved.push(resolver.resolve(input).await?);
    }

    Ok(resolved)
}

/// Collected contents of all inputs, in the order they were given
pub async fn collect_inputs(ctx: &RunContext, inputs: &[String]) -> Result<Vec<LabeledContent>> {
    let resolved = resolve_inputs(ctx, inputs).await?;
    let mut contents = Vec::new();

    for (input, path) in inputs.iter().zip(&resolved) {
        contents.extend(collect(input, path).await?);
    }

    Ok(contents)
}

/// Build the prompt for a set of inputs
pub async fn generate_prompt(ctx: &RunContext, inputs: &[String]) -> Result<Prompt> {
    let contents = collect_inputs(ctx, inputs).await?;
    Ok(build(&contents))
}

/// Run the whole pipeline.
///
/// Generated text is forwarded to `sink` as it becomes available: fragment
/// by fragment when streaming, all at once otherwise.
pub async fn run<B>(
    ctx: &RunContext,
    inputs: &[String],
    backend: &B,
    sink: &mut (dyn Write + Send),
) -> Result<RunReport>
where
    B: CompletionBackend + ?Sized,
{
    let options = ctx.options();
    let prompt = generate_prompt(ctx, inputs).await?;

    let mode = options.response_mode();
    if mode == ResponseMode::Streamed {
        tracing::info!(output = %options.output_name, "Output to be written to");
    }

    let result = complete(backend, &prompt, &options.model, mode, sink, ctx.show_progress).await?;
    let output_path = write_output(&result.text, &options.output_name, ctx.source_root()).await?;

    Ok(RunReport {
        mode: result.mode,
        output_path,
        usage: result.usage,
        text: result.text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(temp_dir: &TempDir) -> RunContext {
        RunContext::new(EffectiveOptions::default(), temp_dir.path(), false)
    }

    #[test]
    fn test_context_source_root() {
        let ctx = RunContext::new(EffectiveOptions::default(), "/work", false);
        assert_eq!(ctx.source_root(), Path::new("/work/src"));
        assert_eq!(ctx.working_dir(), Path::new("/work"));
    }

    #[tokio::test]
    async fn test_collect_preserves_input_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("src");
        std::fs::create_dir_all(root.join("dir")).unwrap();
        std::fs::write(root.join("z.rs"), "z").unwrap();
        std::fs::write(root.join("dir").join("a.rs"), "a").unwrap();

        let inputs = vec!["z.rs".to_string(), "dir".to_string()];
        let contents = collect_inputs(&context(&temp_dir), &inputs).await.unwrap();

        let labels: Vec<&str> = contents.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["z.rs", "a.rs"]);
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_reading() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("src")).unwrap();

        let inputs = vec!["missing.rs".to_string()];
        let err = generate_prompt(&context(&temp_dir), &inputs).await.unwrap_err();
        assert!(err.to_string().contains("missing.rs"));
    }
}

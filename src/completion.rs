//! Response consumption for buffered and streamed completions
//!
//! Both modes feed the same [`Accumulator`]: every fragment is forwarded to
//! the live sink and appended to the final text. Buffered mode simply
//! delivers the whole reply as one fragment once it has arrived.

use crate::errors::{F2ReadError, Result};
use crate::prompt::Prompt;
use crate::streaming::client::CompletionBackend;
use crate::streaming::types::{ChatRequest, Usage};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::io::Write;
use std::time::Duration;

/// How the reply is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Buffered,
    Streamed,
}

impl ResponseMode {
    pub fn from_stream_flag(stream: bool) -> Self {
        if stream {
            ResponseMode::Streamed
        } else {
            ResponseMode::Buffered
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Buffered => "buffered",
            ResponseMode::Streamed => "streamed",
        }
    }
}

/// Token counts reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageStats {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<Usage> for UsageStats {
    fn from(usage: Usage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl fmt::Display for UsageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Token Usage:")?;
        writeln!(f, "Prompt Tokens: {}", self.prompt_tokens)?;
        writeln!(f, "Completion Tokens: {}", self.completion_tokens)?;
        write!(f, "Total Tokens: {}", self.total_tokens)
    }
}

/// Final text of a completion plus whatever usage the service reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub text: String,
    pub usage: Option<UsageStats>,
    pub mode: ResponseMode,
}

/// Shared accumulation contract for both response modes.
///
/// The sink is best effort: once a write fails it is dropped and the text
/// keeps accumulating, so the output file does not depend on the console.
pub struct Accumulator<'a> {
    text: String,
    usage: Option<UsageStats>,
    sink: Option<&'a mut (dyn Write + Send)>,
}

impl<'a> Accumulator<'a> {
    pub fn new(sink: &'a mut (dyn Write + Send)) -> Self {
        Self {
            text: String::new(),
            usage: None,
            sink: Some(sink),
        }
    }

    /// Forward a fragment to the sink and append it
    pub fn push(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }

        if let Some(sink) = self.sink.as_mut() {
            let written = sink
                .write_all(fragment.as_bytes())
                .and_then(|()| sink.flush());
            if let Err(e) = written {
                tracing::warn!(error = %e, "Console output failed; continuing without it");
                self.sink = None;
            }
        }

        self.text.push_str(fragment);
    }

    pub fn record_usage(&mut self, usage: Usage) {
        self.usage = Some(usage.into());
    }

    pub fn finish(self, mode: ResponseMode) -> CompletionResult {
        CompletionResult {
            text: self.text,
            usage: self.usage,
            mode,
        }
    }
}

/// Send the prompt and consume the reply in the requested mode
pub async fn complete<B>(
    backend: &B,
    prompt: &Prompt,
    model: &str,
    mode: ResponseMode,
    sink: &mut (dyn Write + Send),
    show_progress: bool,
) -> Result<CompletionResult>
where
    B: CompletionBackend + ?Sized,
{
    let request = ChatRequest::new(model, prompt.as_str(), mode == ResponseMode::Streamed);
    let mut accumulator = Accumulator::new(sink);

    tracing::info!(model, mode = mode.as_str(), prompt_bytes = prompt.as_str().len(), "Requesting completion");

    match mode {
        ResponseMode::Buffered => {
            let spinner = waiting_spinner(show_progress, model);
            let completion = backend.complete(&request).await;
            spinner.finish_and_clear();

            let completion = completion?.into_result()?;
            let text = completion
                .first_content()
                .ok_or_else(|| F2ReadError::ApiError("Response contained no choices".to_string()))?;

            accumulator.push(&text);
            if let Some(usage) = completion.usage {
                accumulator.record_usage(usage);
            }
        }
        ResponseMode::Streamed => {
            let mut chunks = backend.complete_stream(&request).await?;
            let mut fragments = 0usize;

            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                accumulator.push(chunk.fragment());
                if let Some(usage) = chunk.usage {
                    accumulator.record_usage(usage);
                }
                fragments += 1;
            }

            tracing::debug!(fragments, "Stream drained");
        }
    }

    let result = accumulator.finish(mode);
    tracing::info!(chars = result.text.chars().count(), "Completion received");
    Ok(result)
}

fn waiting_spinner(show_progress: bool, model: &str) -> ProgressBar {
    if !show_progress {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Waiting for {}", model));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

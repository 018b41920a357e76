//! Completion service client
//!
//! Provides the chat-completion HTTP client and the incremental SSE parser
//! used for streamed replies.

pub mod client;
pub mod parser;
pub mod types;

// Re-export commonly used types
pub use client::{ChatClient, CompletionBackend, DEFAULT_BASE_URL};
pub use parser::{decode_event_stream, SseEvent, SseParser, MAX_BUFFER_SIZE};
pub use types::{ChatChunk, ChatCompletion, ChatRequest, Usage};

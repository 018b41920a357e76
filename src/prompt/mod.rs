//! Prompt assembly
//!
//! The prompt is a fixed instruction template followed by every collected
//! file, each introduced by a `File: <label>` marker line.

use crate::input::LabeledContent;

/// Bumped whenever [`INSTRUCTION_TEMPLATE`] changes
pub const TEMPLATE_VERSION: u32 = 1;

/// Instructions sent ahead of the file contents
pub const INSTRUCTION_TEMPLATE: &str = "\
Respond only in Markdown (.md) file formatted language, using proper #, ## header types, list types, other proper formatting, etc.
Make sure your response is proper markdown syntax, with no errors.
Examine the following text, figure out what each file specified does.
Give a file name a # header with a ### header description underneath explaining what the file is and could possibly be used for.
Then provide sections underneath the description explaining each function in the code as a numbered list of items.

Code for each file is as follows:

";

/// Fully assembled prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Format one section as marker line, raw text and blank separator line
pub fn format_section(content: &LabeledContent) -> String {
    format!("File: {}\n{}\n\n", content.label, content.text)
}

/// Build the prompt from contents in collection order
pub fn build(contents: &[LabeledContent]) -> Prompt {
    let sections: String = contents.iter().map(format_section).collect();

    tracing::debug!(
        sections = contents.len(),
        template_version = TEMPLATE_VERSION,
        "Prompt assembled"
    );

    let mut prompt = String::with_capacity(INSTRUCTION_TEMPLATE.len() + sections.len());
    prompt.push_str(INSTRUCTION_TEMPLATE);
    prompt.push_str(&sections);
    Prompt(prompt)
}

//! Prompt serving over the Model Context Protocol.

mod mcp;

pub use mcp::{serve_stdio, SopPromptServer, SERVER_NAME, USER_INPUT_ARGUMENT};

/// Wrap an SOP and the caller's input into the prompt text sent to the model.
pub fn render_prompt(name: &str, content: &str, user_input: &str) -> String {
    format!(
        "Run this SOP:\n<agent-sop name=\"{name}\">\n<content>\n{content}\n</content>\n<user-input>\n{user_input}\n</user-input>\n</agent-sop>"
    )
}

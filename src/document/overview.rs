//! Overview section extraction used for prompt and skill descriptions.

const OVERVIEW_HEADING: &str = "## Overview";

/// Extract the `## Overview` section as a single line.
///
/// The section runs until the next line starting with `#` or the end of the
/// document. Returns `None` when the heading is absent or the section is blank.
pub fn extract_overview(content: &str) -> Option<String> {
    let mut lines = content.lines();
    lines.find(|line| line.trim_end() == OVERVIEW_HEADING)?;

    let body: Vec<&str> = lines.take_while(|line| !line.starts_with('#')).collect();
    let text = body.join("\n");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.replace('\n', " "))
}

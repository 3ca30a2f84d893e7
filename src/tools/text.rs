/// Reverse String Tool
///
/// Reverses text by Unicode scalar value and reports whether it reads the
/// same backwards, ignoring case.

use serde::Serialize;

use crate::core::error::ToolError;
use crate::core::registry::{ParamSpec, ParamType, ToolDescriptor, ToolKind};

pub const NAME: &str = "reverse_string";

/// Characters of input echoed into the log line.
const LOG_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReversedText {
    pub original: String,
    pub reversed: String,
    pub palindrome: bool,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME.to_string(),
        title: "Reverse String".to_string(),
        description: "Reverse a text string".to_string(),
        params: vec![ParamSpec::required("text", ParamType::String, "Text to reverse")],
        kind: ToolKind::ReverseString,
    }
}

pub fn reverse(text: &str) -> Result<ReversedText, ToolError> {
    tracing::info!(text = %preview(text), "Reversing text");

    if text.is_empty() {
        return Err(ToolError::invalid("Text parameter cannot be empty"));
    }

    let reversed: String = text.chars().rev().collect();
    let palindrome = text.to_lowercase() == reversed.to_lowercase();

    Ok(ReversedText {
        original: text.to_string(),
        reversed,
        palindrome,
    })
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Tools Module
///
/// This module contains the MCP tool implementations. Each tool module exports
/// a `descriptor` function with its registration metadata and a pure
/// computation; `execute` maps a `ToolKind` onto the matching computation.

pub mod health;
pub mod rectangle;
pub mod text;
pub mod time;

use serde::Serialize;

use crate::core::error::ToolError;
use crate::core::registry::{Arguments, ToolContext, ToolKind, ToolRegistry};

/// Structured result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    CurrentTime(time::CurrentTime),
    RectangleArea(rectangle::RectangleArea),
    ReversedText(text::ReversedText),
    Health(health::HealthReport),
}

/// Run the computation selected by `kind` on already-validated arguments.
pub fn execute(kind: ToolKind, args: &Arguments, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
    match kind {
        ToolKind::CurrentTime => {
            let format = args.string("format")?;
            Ok(ToolOutput::CurrentTime(time::current_time(ctx.clock.as_ref(), format)))
        }
        ToolKind::RectangleArea => {
            let width = args.number("width")?;
            let height = args.number("height")?;
            rectangle::calculate(width, height).map(ToolOutput::RectangleArea)
        }
        ToolKind::ReverseString => {
            let text = args.string("text")?;
            text::reverse(text).map(ToolOutput::ReversedText)
        }
        ToolKind::Health => Ok(ToolOutput::Health(health::check(ctx.clock.as_ref(), &ctx.server))),
    }
}

/// Build the registry with every tool the server exposes.
///
/// Add new tool registrations here following this pattern:
/// `registry.register(your_tool::descriptor())?;`
pub fn build_registry(ctx: ToolContext) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new(ctx);
    registry.register(time::descriptor())?;
    registry.register(rectangle::descriptor())?;
    registry.register(text::descriptor())?;
    registry.register(health::descriptor())?;
    Ok(registry)
}

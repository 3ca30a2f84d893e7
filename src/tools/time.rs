/// Current Time Tool
///
/// Renders the injected clock's current instant either as ISO-8601
/// (`format == "iso"`) or as `YYYY-MM-DD HH:MM:SS` for any other format.

use serde::Serialize;

use crate::core::clock::{Clock, iso8601, readable, unix_timestamp};
use crate::core::registry::{ParamSpec, ParamType, ParamValue, ToolDescriptor, ToolKind};

pub const NAME: &str = "get_current_time";
pub const DEFAULT_FORMAT: &str = "readable";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentTime {
    pub current_time: String,
    pub format: String,
    pub unix_timestamp: f64,
    pub timezone: String,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME.to_string(),
        title: "Get Current Time".to_string(),
        description: "Get the current date and time".to_string(),
        params: vec![ParamSpec::optional(
            "format",
            ParamType::String,
            "Time format: 'iso' or 'readable'",
            ParamValue::String(DEFAULT_FORMAT.to_string()),
        )],
        kind: ToolKind::CurrentTime,
    }
}

pub fn current_time(clock: &dyn Clock, format: &str) -> CurrentTime {
    tracing::info!(format, "Getting current time");

    let now = clock.now();
    let current_time = if format == "iso" {
        iso8601(&now)
    } else {
        readable(&now)
    };

    CurrentTime {
        current_time,
        format: format.to_string(),
        unix_timestamp: unix_timestamp(&now),
        timezone: clock.timezone(),
    }
}

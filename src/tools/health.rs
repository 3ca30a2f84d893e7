/// Health Check Tool
///
/// Tool-level health report. The HTTP `/health` route is a separate liveness
/// check and does not go through the registry.

use serde::Serialize;

use crate::core::clock::{Clock, iso8601};
use crate::core::config::ServerInfo;
use crate::core::registry::{ToolDescriptor, ToolKind};

pub const NAME: &str = "health";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub server_name: String,
    pub version: String,
    pub timestamp: String,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME.to_string(),
        title: "Health Check".to_string(),
        description: "Check server health status".to_string(),
        params: Vec::new(),
        kind: ToolKind::Health,
    }
}

pub fn check(clock: &dyn Clock, server: &ServerInfo) -> HealthReport {
    tracing::info!("Performing health check");

    HealthReport {
        status: "ok".to_string(),
        server_name: server.name.clone(),
        version: server.version.clone(),
        timestamp: iso8601(&clock.now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::DateTime;

    #[test]
    fn test_report() {
        let clock = FixedClock(DateTime::parse_from_rfc3339("2024-06-30T08:00:00.5+01:00").unwrap());
        let server = ServerInfo { name: "demo".into(), version: "9.9.9".into() };
        assert_eq!(
            check(&clock, &server),
            HealthReport {
                status: "ok".to_string(),
                server_name: "demo".to_string(),
                version: "9.9.9".to_string(),
                timestamp: "2024-06-30T08:00:00.500+01:00".to_string(),
            }
        );
    }

    #[test]
    fn test_descriptor_has_no_parameters() {
        let schema = descriptor().input_schema();
        assert_eq!(schema["properties"], serde_json::json!({}));
        assert_eq!(schema["required"], serde_json::json!([]));
    }
}

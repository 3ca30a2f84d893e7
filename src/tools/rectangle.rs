/// Rectangle Area Tool

use serde::Serialize;

use crate::core::error::ToolError;
use crate::core::registry::{ParamSpec, ParamType, ToolDescriptor, ToolKind};

pub const NAME: &str = "calculate_rectangle_area";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectangleArea {
    pub width: f64,
    pub height: f64,
    pub area: f64,
    pub perimeter: f64,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: NAME.to_string(),
        title: "Calculate Rectangle Area".to_string(),
        description: "Calculate the area of a rectangle".to_string(),
        params: vec![
            ParamSpec::required("width", ParamType::Number, "Width of the rectangle"),
            ParamSpec::required("height", ParamType::Number, "Height of the rectangle"),
        ],
        kind: ToolKind::RectangleArea,
    }
}

/// Area and perimeter of a `width` x `height` rectangle. Both sides must be
/// strictly positive.
pub fn calculate(width: f64, height: f64) -> Result<RectangleArea, ToolError> {
    tracing::info!(width, height, "Calculating rectangle area");

    if width <= 0.0 || height <= 0.0 {
        return Err(ToolError::invalid("Width and height must be positive numbers"));
    }

    let area = width * height;
    let perimeter = 2.0 * (width + height);
    if !area.is_finite() || !perimeter.is_finite() {
        return Err(ToolError::invalid(
            "Rectangle dimensions are too large to compute area and perimeter",
        ));
    }

    Ok(RectangleArea { width, height, area, perimeter })
}

use std::fmt;

use geo::{coord, Coord, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// A rectangular candidate area reported by the region proposer, in image
/// pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn bounds(&self) -> Rect<f64> {
        to_rect(self.x, self.y, self.width, self.height)
    }

    pub fn centroid(&self) -> Coord<f64> {
        self.bounds().center()
    }
}

/// A recognized string with its axis-aligned box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f32,
}

impl TextSpan {
    pub fn bounds(&self) -> Rect<f64> {
        to_rect(self.x, self.y, self.width, self.height)
    }

    pub fn centroid(&self) -> Coord<f64> {
        self.bounds().center()
    }
}

/// Raw OCR output before confidence filtering: a quadrilateral, the string and
/// the engine's confidence.
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub bounds: Polygon<f64>,
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Button,
    Input,
    Textarea,
    Label,
    Card,
}

impl WidgetType {
    pub const ALL: [WidgetType; 5] = [
        WidgetType::Button,
        WidgetType::Input,
        WidgetType::Textarea,
        WidgetType::Label,
        WidgetType::Card,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Button => "button",
            WidgetType::Input => "input",
            WidgetType::Textarea => "textarea",
            WidgetType::Label => "label",
            WidgetType::Card => "card",
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final output unit: one surviving region, its widget type and the text of
/// the span associated with it (empty when none qualified).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedComponent {
    pub id: u32,
    #[serde(rename = "type")]
    pub widget: WidgetType,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

fn to_rect(x: i32, y: i32, width: i32, height: i32) -> Rect<f64> {
    Rect::new(
        coord! { x: x as f64, y: y as f64 },
        coord! { x: x as f64 + width as f64, y: y as f64 + height as f64 },
    )
}

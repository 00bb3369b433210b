use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    /// Label size in `em`.
    pub font_size: f32,
    pub label_color: String,
    pub background: String,
    pub gradient_start: String,
    pub gradient_end: String,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
}

impl Theme {
    /// Black canvas with blue-to-red chords.
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 0.5,
            label_color: "rgb(255,255,255)".to_string(),
            background: "rgb(0,0,0)".to_string(),
            gradient_start: "rgb(0,68,194)".to_string(),
            gradient_end: "rgb(235,0,65)".to_string(),
            stroke_width: 1.0,
            stroke_opacity: 0.1,
        }
    }

    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 0.5,
            label_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            gradient_start: "#2F6FDB".to_string(),
            gradient_end: "#D9480F".to_string(),
            stroke_width: 1.0,
            stroke_opacity: 0.1,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" | "dark" => Some(Self::classic()),
            "light" | "modern" => Some(Self::light()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

use crate::error::{Error, Result};
use crate::layout::LayoutConfig;
use crate::scan::DEFAULT_EXTENSIONS;
use crate::theme::Theme;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    label_color: Option<String>,
    background: Option<String>,
    gradient_start: Option<String>,
    gradient_end: Option<String>,
    stroke_width: Option<f32>,
    stroke_opacity: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    canvas_size: Option<f32>,
    radius_ratio: Option<f32>,
    folder_spacing: Option<usize>,
    group_by_folder: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanConfigFile {
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    scan: Option<ScanConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_config(&contents)?)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile =
        serde_json::from_str(contents).map_err(|err| Error::Config(err.to_string()))?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| Error::Config(format!("unknown theme '{theme_name}'")))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.gradient_start {
            config.theme.gradient_start = v;
        }
        if let Some(v) = vars.gradient_end {
            config.theme.gradient_end = v;
        }
        if let Some(v) = vars.stroke_width {
            config.theme.stroke_width = v;
        }
        if let Some(v) = vars.stroke_opacity {
            config.theme.stroke_opacity = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.canvas_size {
            config.layout.canvas_size = v;
        }
        if let Some(v) = layout.radius_ratio {
            config.layout.radius_ratio = v;
        }
        if let Some(v) = layout.folder_spacing {
            config.layout.folder_spacing = v;
        }
        if let Some(v) = layout.group_by_folder {
            config.layout.group_by_folder = v;
        }
    }

    if let Some(scan) = parsed.scan {
        if let Some(v) = scan.extensions {
            config.scan.extensions = v
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect();
        }
    }

    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if !(config.layout.canvas_size > 0.0) {
        return Err(Error::Config("canvas size must be positive".to_string()));
    }
    if !(config.layout.radius_ratio > 0.0 && config.layout.radius_ratio <= 0.5) {
        return Err(Error::Config(
            "radius ratio must be in (0, 0.5]".to_string(),
        ));
    }
    if config.scan.extensions.is_empty() {
        return Err(Error::Config("extension list is empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.canvas_size, 2000.0);
        assert_eq!(config.scan.extensions, vec!["cpp", "hpp", "h"]);
        assert_eq!(config.theme.stroke_opacity, 0.1);
    }

    #[test]
    fn overrides_are_merged() {
        let config = parse_config(
            r##"{
                "theme": "light",
                "themeVariables": { "gradientStart": "#000000", "fontSize": 0.8 },
                "layout": { "canvasSize": 1000, "groupByFolder": false },
                "scan": { "extensions": [".cc", "hh"] }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.background, "#FFFFFF");
        assert_eq!(config.theme.gradient_start, "#000000");
        assert_eq!(config.theme.font_size, 0.8);
        assert_eq!(config.layout.canvas_size, 1000.0);
        assert!(!config.layout.group_by_folder);
        assert_eq!(config.layout.folder_spacing, 2);
        assert_eq!(config.scan.extensions, vec!["cc", "hh"]);
    }

    #[test]
    fn rejects_unknown_theme_and_bad_layout() {
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
        assert!(parse_config(r#"{"layout": {"radiusRatio": 0.9}}"#).is_err());
        assert!(parse_config(r#"{"scan": {"extensions": []}}"#).is_err());
        assert!(parse_config("not json").is_err());
    }
}

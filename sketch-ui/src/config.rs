// Board configuration, loaded from JSON with every field optional.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sketch_core::ToolSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Color the surface is cleared to; erasers restore it.
    #[serde(default = "default_background")]
    pub background: String,

    /// Used when a stroke color cannot be parsed, and as the initial pen color.
    #[serde(default = "default_color")]
    pub default_color: String,

    #[serde(default = "default_stroke_width")]
    pub default_width: f32,

    #[serde(default)]
    pub tools: ToolSet,
}

fn default_width() -> u32 {
    512
}

fn default_height() -> u32 {
    512
}

fn default_background() -> String {
    "transparent".into()
}

fn default_color() -> String {
    "#000000".into()
}

fn default_stroke_width() -> f32 {
    5.0
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: default_background(),
            default_color: default_color(),
            default_width: default_stroke_width(),
            tools: ToolSet::default(),
        }
    }
}

/// Load a board configuration from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<BoardConfig> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)
        .with_context(|| format!("read board config: {}", path.display()))?;
    let config: BoardConfig = serde_json::from_str(&data).context("parse board config json")?;
    tracing::debug!(
        width = config.width,
        height = config.height,
        "board config loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_takes_defaults() {
        let config: BoardConfig =
            serde_json::from_str(r#"{"width": 768, "tools": {"eraser": false}}"#).unwrap();
        assert_eq!(config.width, 768);
        assert_eq!(config.height, 512);
        assert_eq!(config.default_color, "#000000");
        assert!(!config.tools.eraser);
        assert!(config.tools.pen);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config("target/does-not-exist/board.json").unwrap_err();
        assert!(format!("{err:#}").contains("board.json"));
    }
}

// Tool sets offered by a drawing surface.

use serde::{Deserialize, Serialize};

use crate::ToolKind;

/// Which tools a page exposes. Every page shares the same history and stroke
/// logic; only the tool set differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSet {
    #[serde(default = "enabled")]
    pub pen: bool,
    #[serde(default = "enabled")]
    pub eraser: bool,
    #[serde(default = "enabled")]
    pub image_upload: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::full()
    }
}

impl ToolSet {
    pub fn full() -> Self {
        Self {
            pen: true,
            eraser: true,
            image_upload: true,
        }
    }

    /// Pen only, as used by plain sketch-to-image pages.
    pub fn pen_only() -> Self {
        Self {
            pen: true,
            eraser: false,
            image_upload: false,
        }
    }

    pub fn allows(&self, kind: ToolKind) -> bool {
        match kind {
            ToolKind::Pen => self.pen,
            ToolKind::Eraser => self.eraser,
        }
    }
}

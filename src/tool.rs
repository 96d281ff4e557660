use egui::Color32;
use serde::{Deserialize, Serialize};

/// Default pen color when no color has been picked yet.
pub const DEFAULT_PEN_COLOR: Color32 = Color32::BLACK;

/// Stroke width bounds enforced by the slider in the tools panel.
/// They are *not* enforced by `ToolState` itself; internal callers must not
/// assume the bound holds.
pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 50;

/// Which drawing tool is active.
///
/// An explicit mode rather than "color equals background": a user picking a
/// pen color that happens to match the background stays in pen mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMode {
    Pen,
    Eraser,
}

/// Style applied to each stroke segment as it is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: Color32,
    /// Width in pixels. Positive, nominally within the slider bounds.
    pub width: u32,
}

/// Current tool selection: mode, pen color and stroke width.
///
/// The pen color is retained while erasing, so switching back to the pen
/// restores the last chosen color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolState {
    mode: ToolMode,
    color: Color32,
    width: u32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            mode: ToolMode::Pen,
            color: DEFAULT_PEN_COLOR,
            width: 5,
        }
    }
}

impl ToolState {
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_eraser(&self) -> bool {
        self.mode == ToolMode::Eraser
    }

    /// Switch to the pen, keeping the previously chosen color.
    pub fn set_pen(&mut self) {
        self.mode = ToolMode::Pen;
    }

    pub fn set_eraser(&mut self) {
        self.mode = ToolMode::Eraser;
    }

    /// Picking a color always switches back to the pen.
    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
        self.mode = ToolMode::Pen;
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    /// The style the drawing surface should rasterize with right now.
    /// Eraser strokes paint the background color, not true transparency.
    pub fn stroke_style(&self, background: Color32) -> StrokeStyle {
        let color = match self.mode {
            ToolMode::Pen => self.color,
            ToolMode::Eraser => background,
        };
        StrokeStyle { color, width: self.width }
    }
}

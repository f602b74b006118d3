//! Drawing surface abstraction
//!
//! The renderer only needs a handful of 2D canvas calls. `RecordingSurface`
//! captures them as commands so frames can be inspected headlessly.

/// Minimal 2D drawing surface
pub trait Surface {
    fn set_shadow(&mut self, color: &str, blur: f64);
    fn set_line_join(&mut self, join: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
}

/// A single recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Shadow { color: String, blur: f64 },
    LineJoin(String),
    LineWidth(f64),
    FillStyle(String),
    StrokeStyle(String),
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
}

/// Surface that records every call instead of rasterizing
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drop everything recorded so far
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Filled rectangles, in draw order
    pub fn filled_rects(&self) -> Vec<(f64, f64, f64, f64)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { x, y, width, height } => Some((*x, *y, *width, *height)),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn set_shadow(&mut self, color: &str, blur: f64) {
        self.commands.push(DrawCommand::Shadow {
            color: color.to_string(),
            blur,
        });
    }

    fn set_line_join(&mut self, join: &str) {
        self.commands.push(DrawCommand::LineJoin(join.to_string()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_fill_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::FillStyle(color.to_string()));
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.commands.push(DrawCommand::StrokeStyle(color.to_string()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::FillRect { x, y, width, height });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::StrokeRect { x, y, width, height });
    }
}

use super::surface::{Rect, Rgba, Surface};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    FillRect(Rect, Rgba),
    Line {
        from: (f64, f64),
        to: (f64, f64),
        line_width: f64,
        color: Rgba,
    },
    Present,
}

/// Surface that keeps every draw call, for headless rendering and tests.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn fills(&self) -> impl Iterator<Item = (Rect, Rgba)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::FillRect(rect, color) => Some((*rect, *color)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (f64, Rgba)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line {
                line_width, color, ..
            } => Some((*line_width, *color)),
            _ => None,
        })
    }

    pub fn presented_frames(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Present))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            line_width,
            color,
        });
    }

    fn present(&mut self) {
        self.commands.push(DrawCommand::Present);
    }
}

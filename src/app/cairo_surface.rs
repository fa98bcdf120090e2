use crate::render::{Rect, Rgba, Surface};

/// Draws into the cairo context GTK hands to a `DrawingArea` draw function.
pub(super) struct CairoSurface<'a> {
    context: &'a gtk4::cairo::Context,
    width: f64,
    height: f64,
}

impl<'a> CairoSurface<'a> {
    pub(super) fn new(context: &'a gtk4::cairo::Context, width: i32, height: i32) -> Self {
        Self {
            context,
            width: f64::from(width.max(0)),
            height: f64::from(height.max(0)),
        }
    }

    fn set_color(&self, color: Rgba) {
        self.context
            .set_source_rgba(color.r, color.g, color.b, color.a);
    }
}

fn log_cairo_failure(operation: &str, result: Result<(), gtk4::cairo::Error>) {
    if let Err(err) = result {
        tracing::debug!(?err, operation, "cairo drawing operation failed");
    }
}

impl Surface for CairoSurface<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.set_color(color);
        log_cairo_failure("paint", self.context.paint());
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.set_color(color);
        self.context
            .rectangle(rect.x, rect.y, rect.width, rect.height);
        log_cairo_failure("fill", self.context.fill());
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: Rgba) {
        self.set_color(color);
        self.context.set_line_width(line_width);
        self.context.move_to(from.0, from.1);
        self.context.line_to(to.0, to.1);
        log_cairo_failure("stroke", self.context.stroke());
    }

    // GTK swaps buffers once the draw function returns.
    fn present(&mut self) {}
}

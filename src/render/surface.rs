#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(clamp_unit(r), clamp_unit(g), clamp_unit(b), 1.0)
    }

    pub fn gray(intensity: f64) -> Self {
        Self::opaque(intensity, intensity, intensity)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A frame being drawn by one window. Coordinates are pixels, origin top-left.
pub trait Surface {
    fn width(&self) -> f64;

    fn height(&self) -> f64;

    fn clear(&mut self, color: Rgba);

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), line_width: f64, color: Rgba);

    fn present(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_clamps_out_of_range_and_nan_channels() {
        let color = Rgba::opaque(-0.5, 1.7, f64::NAN);
        assert_eq!(color, Rgba::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(Rgba::gray(0.25), Rgba::new(0.25, 0.25, 0.25, 1.0));
    }
}

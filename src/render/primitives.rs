use super::surface::{Rect, Rgba, Surface};

pub const GRID_COLOR: Rgba = Rgba::new(0.3, 0.8, 0.3, 0.3);
pub const SAMPLE_GRID_LINE_WIDTH: f64 = 1.0;
pub const BATCH_GRID_LINE_WIDTH: f64 = 4.0;

pub fn draw_filled_rectangle(
    surface: &mut dyn Surface,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: Rgba,
) {
    surface.fill_rect(Rect::new(x, y, width, height), color);
}

/// Divides the whole surface into `cells_x` × `cells_y` cells, outer border included.
pub fn draw_grid(
    surface: &mut dyn Surface,
    color: Rgba,
    cells_x: usize,
    cells_y: usize,
    line_width: f64,
) {
    if cells_x == 0 || cells_y == 0 {
        return;
    }
    let width = surface.width();
    let height = surface.height();

    let step_x = width / cells_x as f64;
    for column in 0..=cells_x {
        let x = column as f64 * step_x;
        surface.stroke_line((x, 0.0), (x, height), line_width, color);
    }

    let step_y = height / cells_y as f64;
    for row in 0..=cells_y {
        let y = row as f64 * step_y;
        surface.stroke_line((0.0, y), (width, y), line_width, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};

    #[test]
    fn grid_draws_cell_borders_including_outer_edges() {
        let mut surface = RecordingSurface::new(300.0, 100.0);
        draw_grid(&mut surface, GRID_COLOR, 3, 2, BATCH_GRID_LINE_WIDTH);

        let lines = surface.commands();
        assert_eq!(lines.len(), 4 + 3);
        assert_eq!(
            lines[1],
            DrawCommand::Line {
                from: (100.0, 0.0),
                to: (100.0, 100.0),
                line_width: BATCH_GRID_LINE_WIDTH,
                color: GRID_COLOR,
            }
        );
        assert_eq!(
            lines[5],
            DrawCommand::Line {
                from: (0.0, 50.0),
                to: (300.0, 50.0),
                line_width: BATCH_GRID_LINE_WIDTH,
                color: GRID_COLOR,
            }
        );
    }

    #[test]
    fn grid_with_no_cells_draws_nothing() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        draw_grid(&mut surface, GRID_COLOR, 0, 4, SAMPLE_GRID_LINE_WIDTH);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn filled_rectangle_forwards_geometry() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        draw_filled_rectangle(&mut surface, 1.0, 2.0, 3.0, 4.0, Rgba::BLACK);
        assert_eq!(
            surface.commands(),
            &[DrawCommand::FillRect(Rect::new(1.0, 2.0, 3.0, 4.0), Rgba::BLACK)]
        );
    }
}

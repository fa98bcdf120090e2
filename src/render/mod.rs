//! Backend-neutral drawing: the [`Surface`] seam, stateless primitives and batch layout.

pub mod layout;
pub mod primitives;
mod recording;
mod surface;

pub use layout::{ceil_sqrt, BatchGrid, GridCell, PixelScale};
pub use primitives::{
    draw_filled_rectangle, draw_grid, BATCH_GRID_LINE_WIDTH, GRID_COLOR, SAMPLE_GRID_LINE_WIDTH,
};
pub use recording::{DrawCommand, RecordingSurface};
pub use surface::{Rect, Rgba, Surface};

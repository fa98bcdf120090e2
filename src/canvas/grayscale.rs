use std::sync::Arc;

use crate::input::KeyBindingResult;
use crate::render::{PixelScale, Rgba, Surface};
use crate::state::SharedContext;
use crate::tensor::{Element, Tensor};
use crate::window::{Window, WindowBase, WindowId};

use super::{
    draw_cell, intensity, Canvas, CanvasBuffer, CanvasState, GrayscaleNormalization, GridMode,
    WindowConfig,
};

/// State of a canvas drawing channel 0 of each sample as one intensity.
#[derive(Debug, Clone)]
pub struct GrayscaleState<T> {
    buffer: CanvasBuffer<T>,
    normalization: GrayscaleNormalization,
    grid: GridMode,
}

impl<T: Element> CanvasState for GrayscaleState<T> {
    type Elem = T;
    const REQUIRED_DEPTH: usize = 1;

    fn buffer(&self) -> &CanvasBuffer<T> {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut CanvasBuffer<T> {
        &mut self.buffer
    }

    fn channel_columns(&self) -> usize {
        1
    }

    fn grid(&self) -> GridMode {
        self.grid
    }

    fn draw_sample(
        &self,
        surface: &mut dyn Surface,
        sample: &Tensor<T>,
        origin: (f64, f64),
        scale: PixelScale,
    ) {
        for y in 0..sample.height() {
            for x in 0..sample.width() {
                let value = intensity(sample, y, x, 0);
                draw_cell(surface, origin, scale, x, y, shade(self.normalization, value));
            }
        }
    }
}

fn shade(normalization: GrayscaleNormalization, value: f64) -> Rgba {
    match normalization {
        GrayscaleNormalization::None => Rgba::gray(value),
        GrayscaleNormalization::HotCold if value >= 0.0 => Rgba::opaque(value, 0.0, 0.0),
        GrayscaleNormalization::HotCold => Rgba::opaque(0.0, 0.0, -value),
    }
}

pub type GrayscaleBatchCanvas<T> = Canvas<GrayscaleState<T>>;

impl<T: Element> Canvas<GrayscaleState<T>> {
    pub fn new(
        shared: &Arc<SharedContext>,
        normalization: GrayscaleNormalization,
        grid: GridMode,
    ) -> Self {
        Self::with_state(
            shared,
            GrayscaleState {
                buffer: CanvasBuffer::default(),
                normalization,
                grid,
            },
        )
    }

    pub fn normalization(&self) -> GrayscaleNormalization {
        self.read(|state| state.normalization).unwrap_or_default()
    }

    pub fn grid_mode(&self) -> GridMode {
        self.read(|state| state.grid).unwrap_or_default()
    }

    pub fn toggle_normalization(&self) -> Option<GrayscaleNormalization> {
        let mode = self.update(|state| {
            state.normalization = state.normalization.next();
            state.normalization
        })?;
        tracing::info!(mode = ?mode, "{}", mode.description());
        Some(mode)
    }

    pub fn toggle_grid(&self) -> Option<GridMode> {
        let mode = self.update(|state| {
            state.grid = state.grid.next();
            state.grid
        })?;
        tracing::info!(mode = ?mode, "{}", mode.description());
        Some(mode)
    }
}

/// Window showing a batch of single-channel matrices. `n` cycles normalization, `g` the grid.
#[derive(Debug)]
pub struct GrayscaleBatchWindow<T> {
    base: WindowBase,
    canvas: GrayscaleBatchCanvas<T>,
}

impl<T: Element> GrayscaleBatchWindow<T> {
    pub fn new(
        id: WindowId,
        config: &WindowConfig,
        shared: &Arc<SharedContext>,
    ) -> KeyBindingResult<Self> {
        let mut base = WindowBase::new(id, config.name.as_str(), config.position, config.size, shared)?;
        let canvas = GrayscaleBatchCanvas::new(shared, config.normalization, config.grid);

        {
            let canvas = canvas.clone();
            base.keys_mut()
                .register('n', "n - toggles normalization mode", move || {
                    canvas.toggle_normalization();
                })?;
        }
        {
            let canvas = canvas.clone();
            base.keys_mut().register('g', "g - toggles grid mode", move || {
                canvas.toggle_grid();
            })?;
        }

        Ok(Self { base, canvas })
    }

    pub fn canvas(&self) -> &GrayscaleBatchCanvas<T> {
        &self.canvas
    }
}

impl<T: Element> Window for GrayscaleBatchWindow<T> {
    fn base(&self) -> &WindowBase {
        &self.base
    }

    fn display_handler(&self, surface: &mut dyn Surface) {
        self.canvas.render(surface);
    }
}

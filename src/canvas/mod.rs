//! Canvases hold a window's batch inside the shared lock and draw it as a tiled grid.
//!
//! A [`Canvas`] is a cheap, cloneable, thread-safe handle. Producers keep one and
//! call `set_sample`/`set_batch`; the window that owns the same canvas calls
//! [`Canvas::render`] from the render loop. Both go through the single
//! [`SharedContext`] lock, and every write replaces the whole batch, so a frame
//! always draws either the previous batch or the new one.

mod grayscale;
mod options;
mod rgb;

pub use grayscale::{GrayscaleBatchCanvas, GrayscaleBatchWindow, GrayscaleState};
pub use options::{ChannelDisplay, GrayscaleNormalization, GridMode, WindowConfig};
pub use rgb::{RgbState, RgbTensorCanvas, RgbTensorWindow};

use std::marker::PhantomData;
use std::sync::Arc;

use thiserror::Error;

use crate::render::{
    draw_filled_rectangle, draw_grid, BatchGrid, PixelScale, Rgba, Surface,
    BATCH_GRID_LINE_WIDTH, GRID_COLOR, SAMPLE_GRID_LINE_WIDTH,
};
use crate::state::{SharedContext, SlotId, SyncScope};
use crate::tensor::{Batch, Element, Tensor};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("sample {index} has {depth} channel(s), at least {required} required; sample skipped")]
    UnsupportedChannelDepth {
        index: usize,
        depth: usize,
        required: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Number of batch replacements seen by the canvas when the frame was drawn.
    pub generation: u64,
    pub samples: usize,
    pub drawn: usize,
    pub skipped: Vec<RenderError>,
}

#[derive(Debug, Clone)]
pub struct CanvasBuffer<T> {
    batch: Batch<T>,
    generation: u64,
    warned_generation: Option<u64>,
}

impl<T> Default for CanvasBuffer<T> {
    fn default() -> Self {
        Self {
            batch: Vec::new(),
            generation: 0,
            warned_generation: None,
        }
    }
}

impl<T: Element> CanvasBuffer<T> {
    pub fn batch(&self) -> &[Arc<Tensor<T>>] {
        &self.batch
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn replace(&mut self, batch: Batch<T>) {
        self.batch = batch;
        self.generation += 1;
    }
}

pub trait CanvasState: Send + 'static {
    type Elem: Element;

    /// Samples with fewer channels are skipped with [`RenderError::UnsupportedChannelDepth`].
    const REQUIRED_DEPTH: usize;

    fn buffer(&self) -> &CanvasBuffer<Self::Elem>;

    fn buffer_mut(&mut self) -> &mut CanvasBuffer<Self::Elem>;

    fn channel_columns(&self) -> usize;

    fn grid(&self) -> GridMode;

    fn draw_sample(
        &self,
        surface: &mut dyn Surface,
        sample: &Tensor<Self::Elem>,
        origin: (f64, f64),
        scale: PixelScale,
    );
}

struct CanvasSlot {
    shared: Arc<SharedContext>,
    slot: SlotId,
}

impl Drop for CanvasSlot {
    fn drop(&mut self) {
        self.shared.remove_slot(self.slot);
    }
}

/// Handle to canvas state living in the shared lock.
///
/// Dropping the last handle while a [`SyncScope`] is alive on the same thread deadlocks.
pub struct Canvas<S> {
    slot: Arc<CanvasSlot>,
    _state: PhantomData<fn() -> S>,
}

impl<S> Clone for Canvas<S> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            _state: PhantomData,
        }
    }
}

impl<S> std::fmt::Debug for Canvas<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("slot", &self.slot.slot)
            .finish_non_exhaustive()
    }
}

impl<S: CanvasState> Canvas<S> {
    pub(crate) fn with_state(shared: &Arc<SharedContext>, state: S) -> Self {
        let slot = shared.insert_slot(state);
        Self {
            slot: Arc::new(CanvasSlot {
                shared: shared.clone(),
                slot,
            }),
            _state: PhantomData,
        }
    }

    pub fn shared(&self) -> &Arc<SharedContext> {
        &self.slot.shared
    }

    pub fn set_sample(&self, sample: Arc<Tensor<S::Elem>>) {
        let mut scope = self.shared().acquire_scoped();
        self.set_sample_unsynchronized(&mut scope, sample);
    }

    pub fn set_sample_unsynchronized(&self, scope: &mut SyncScope<'_>, sample: Arc<Tensor<S::Elem>>) {
        self.replace_in(scope, vec![sample]);
    }

    /// Shows `batch` in order. Only the `Arc`s are cloned, never the tensors.
    pub fn set_batch(&self, batch: &[Arc<Tensor<S::Elem>>]) {
        let mut scope = self.shared().acquire_scoped();
        self.set_batch_unsynchronized(&mut scope, batch);
    }

    pub fn set_batch_unsynchronized(&self, scope: &mut SyncScope<'_>, batch: &[Arc<Tensor<S::Elem>>]) {
        self.replace_in(scope, batch.to_vec());
    }

    pub fn batch(&self) -> Batch<S::Elem> {
        let scope = self.shared().acquire_scoped();
        self.batch_in(&scope)
    }

    pub fn batch_in(&self, scope: &SyncScope<'_>) -> Batch<S::Elem> {
        self.read_in(scope, |state| state.buffer().batch.clone())
            .unwrap_or_default()
    }

    pub fn generation(&self) -> u64 {
        let scope = self.shared().acquire_scoped();
        self.read_in(&scope, |state| state.buffer().generation)
            .unwrap_or_default()
    }

    pub fn render(&self, surface: &mut dyn Surface) -> FrameReport {
        let mut scope = self.shared().acquire_scoped();
        let Some(state) = scope.slot_mut::<S>(self.slot.slot) else {
            tracing::error!(slot = ?self.slot.slot, "canvas state missing from shared context");
            surface.clear(Rgba::BLACK);
            surface.present();
            return FrameReport::default();
        };

        let report = render_frame(&*state, surface);
        let buffer = state.buffer_mut();
        if !report.skipped.is_empty() && buffer.warned_generation != Some(report.generation) {
            for err in &report.skipped {
                tracing::warn!(generation = report.generation, %err, "cannot render sample");
            }
            buffer.warned_generation = Some(report.generation);
        }
        report
    }

    fn replace_in(&self, scope: &mut SyncScope<'_>, batch: Batch<S::Elem>) {
        let len = batch.len();
        let generation = self.update_in(scope, |state| {
            state.buffer_mut().replace(batch);
            state.buffer().generation
        });
        if let Some(generation) = generation {
            tracing::trace!(slot = ?self.slot.slot, len, generation, "replaced canvas batch");
        }
    }

    pub(crate) fn update<R>(&self, apply: impl FnOnce(&mut S) -> R) -> Option<R> {
        let mut scope = self.shared().acquire_scoped();
        self.update_in(&mut scope, apply)
    }

    pub(crate) fn update_in<R>(
        &self,
        scope: &mut SyncScope<'_>,
        apply: impl FnOnce(&mut S) -> R,
    ) -> Option<R> {
        if !scope.belongs_to(self.shared()) {
            tracing::error!(slot = ?self.slot.slot, "lock scope belongs to a different shared context");
            return None;
        }
        match scope.slot_mut::<S>(self.slot.slot) {
            Some(state) => Some(apply(state)),
            None => {
                tracing::error!(slot = ?self.slot.slot, "canvas state missing from shared context");
                None
            }
        }
    }

    pub(crate) fn read<R>(&self, inspect: impl FnOnce(&S) -> R) -> Option<R> {
        let scope = self.shared().acquire_scoped();
        self.read_in(&scope, inspect)
    }

    fn read_in<R>(&self, scope: &SyncScope<'_>, inspect: impl FnOnce(&S) -> R) -> Option<R> {
        if !scope.belongs_to(self.shared()) {
            tracing::error!(slot = ?self.slot.slot, "lock scope belongs to a different shared context");
            return None;
        }
        scope.slot::<S>(self.slot.slot).map(inspect)
    }
}

/// Clears to black, tiles the batch, overlays the grids, presents.
pub fn render_frame<S: CanvasState>(state: &S, surface: &mut dyn Surface) -> FrameReport {
    surface.clear(Rgba::BLACK);

    let buffer = state.buffer();
    let mut report = FrameReport {
        generation: buffer.generation,
        samples: buffer.batch.len(),
        ..FrameReport::default()
    };
    let Some(grid) = BatchGrid::for_len(buffer.batch.len()) else {
        surface.present();
        return report;
    };

    let channel_columns = state.channel_columns();
    let mut sample_dims = None;
    for cell in grid.cells() {
        let sample = &buffer.batch[cell.index];
        if sample.depth() < S::REQUIRED_DEPTH {
            report.skipped.push(RenderError::UnsupportedChannelDepth {
                index: cell.index,
                depth: sample.depth(),
                required: S::REQUIRED_DEPTH,
            });
            continue;
        }
        let Some(scale) = PixelScale::compute(
            surface.width(),
            surface.height(),
            &grid,
            sample.height(),
            sample.width(),
            channel_columns,
        ) else {
            continue;
        };

        let origin = (
            (cell.column * sample.width() * channel_columns) as f64 * scale.x,
            (cell.row * sample.height()) as f64 * scale.y,
        );
        state.draw_sample(surface, sample, origin, scale);
        report.drawn += 1;
        sample_dims.get_or_insert((sample.height(), sample.width()));
    }

    let mode = state.grid();
    if mode.draws_sample_grid() {
        // Cell lines follow the first drawn sample's shape.
        if let Some((height, width)) = sample_dims {
            draw_grid(
                surface,
                GRID_COLOR,
                grid.columns * width * channel_columns,
                grid.rows * height,
                SAMPLE_GRID_LINE_WIDTH,
            );
        }
    }
    if mode.draws_batch_grid() {
        draw_grid(surface, GRID_COLOR, grid.columns, grid.rows, BATCH_GRID_LINE_WIDTH);
    }

    surface.present();
    tracing::trace!(
        generation = report.generation,
        samples = report.samples,
        drawn = report.drawn,
        "rendered batch frame"
    );
    report
}

fn draw_cell(
    surface: &mut dyn Surface,
    origin: (f64, f64),
    scale: PixelScale,
    column: usize,
    row: usize,
    color: Rgba,
) {
    draw_filled_rectangle(
        surface,
        origin.0 + column as f64 * scale.x,
        origin.1 + row as f64 * scale.y,
        scale.x,
        scale.y,
        color,
    );
}

fn intensity<T: Element>(sample: &Tensor<T>, y: usize, x: usize, channel: usize) -> f64 {
    sample.get(y, x, channel).map_or(0.0, Element::intensity)
}

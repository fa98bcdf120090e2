use std::sync::Arc;

use crate::input::KeyBindingResult;
use crate::render::{PixelScale, Rgba, Surface};
use crate::state::SharedContext;
use crate::tensor::{Element, Tensor};
use crate::window::{Window, WindowBase, WindowId};

use super::{
    draw_cell, intensity, Canvas, CanvasBuffer, CanvasState, ChannelDisplay, GridMode,
    WindowConfig,
};

/// State of a canvas drawing the first three channels of each sample.
///
/// Values are used as-is, so anything outside `[0, 1]` is clamped when drawn.
#[derive(Debug, Clone)]
pub struct RgbState<T> {
    buffer: CanvasBuffer<T>,
    channel_display: ChannelDisplay,
    grid: GridMode,
}

impl<T: Element> CanvasState for RgbState<T> {
    type Elem = T;
    const REQUIRED_DEPTH: usize = 3;

    fn buffer(&self) -> &CanvasBuffer<T> {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut CanvasBuffer<T> {
        &mut self.buffer
    }

    fn channel_columns(&self) -> usize {
        self.channel_display.channel_columns()
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
        let width = sample.width();
        for y in 0..sample.height() {
            for x in 0..width {
                let red = intensity(sample, y, x, 0);
                let green = intensity(sample, y, x, 1);
                let blue = intensity(sample, y, x, 2);
                match self.channel_display {
                    ChannelDisplay::Rgb => {
                        draw_cell(surface, origin, scale, x, y, Rgba::opaque(red, green, blue));
                    }
                    ChannelDisplay::SeparateColor => {
                        draw_cell(surface, origin, scale, x, y, Rgba::opaque(red, 0.0, 0.0));
                        draw_cell(surface, origin, scale, width + x, y, Rgba::opaque(0.0, green, 0.0));
                        draw_cell(surface, origin, scale, 2 * width + x, y, Rgba::opaque(0.0, 0.0, blue));
                    }
                    ChannelDisplay::SeparateGrayscale => {
                        draw_cell(surface, origin, scale, x, y, Rgba::gray(red));
                        draw_cell(surface, origin, scale, width + x, y, Rgba::gray(green));
                        draw_cell(surface, origin, scale, 2 * width + x, y, Rgba::gray(blue));
                    }
                }
            }
        }
    }
}

pub type RgbTensorCanvas<T> = Canvas<RgbState<T>>;

impl<T: Element> Canvas<RgbState<T>> {
    pub fn new(shared: &Arc<SharedContext>, channel_display: ChannelDisplay, grid: GridMode) -> Self {
        Self::with_state(
            shared,
            RgbState {
                buffer: CanvasBuffer::default(),
                channel_display,
                grid,
            },
        )
    }

    pub fn channel_display(&self) -> ChannelDisplay {
        self.read(|state| state.channel_display).unwrap_or_default()
    }

    pub fn grid_mode(&self) -> GridMode {
        self.read(|state| state.grid).unwrap_or_default()
    }

    pub fn toggle_channel_display(&self) -> Option<ChannelDisplay> {
        let mode = self.update(|state| {
            state.channel_display = state.channel_display.next();
            state.channel_display
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

/// Window showing a batch of RGB tensors. `c` cycles the channel display, `g` the grid.
#[derive(Debug)]
pub struct RgbTensorWindow<T> {
    base: WindowBase,
    canvas: RgbTensorCanvas<T>,
}

impl<T: Element> RgbTensorWindow<T> {
    pub fn new(
        id: WindowId,
        config: &WindowConfig,
        shared: &Arc<SharedContext>,
    ) -> KeyBindingResult<Self> {
        let mut base = WindowBase::new(id, config.name.as_str(), config.position, config.size, shared)?;
        let canvas = RgbTensorCanvas::new(shared, config.channel_display, config.grid);

        {
            let canvas = canvas.clone();
            base.keys_mut()
                .register('c', "c - toggles channel display mode", move || {
                    canvas.toggle_channel_display();
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

    pub fn canvas(&self) -> &RgbTensorCanvas<T> {
        &self.canvas
    }
}

impl<T: Element> Window for RgbTensorWindow<T> {
    fn base(&self) -> &WindowBase {
        &self.base
    }

    fn display_handler(&self, surface: &mut dyn Surface) {
        self.canvas.render(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{FrameReport, RenderError};
    use crate::input::KeyBindingError;
    use crate::render::{DrawCommand, Rect, RecordingSurface, BATCH_GRID_LINE_WIDTH, SAMPLE_GRID_LINE_WIDTH};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    fn rgb_sample(height: usize, width: usize, value: f32) -> Arc<Tensor<f32>> {
        Arc::new(Tensor::filled(height, width, 3, value).expect("shape should fit"))
    }

    fn window(shared: &Arc<SharedContext>, config: WindowConfig) -> RgbTensorWindow<f32> {
        RgbTensorWindow::new(WindowId(1), &config, shared).expect("window should build")
    }

    #[test]
    fn set_sample_yields_a_single_element_batch_holding_that_tensor() {
        let shared = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::None);
        let sample = rgb_sample(2, 2, 0.5);

        canvas.set_sample(sample.clone());

        let batch = canvas.batch();
        assert_eq!(batch.len(), 1);
        assert!(Arc::ptr_eq(&batch[0], &sample));
        assert_eq!(canvas.generation(), 1);
    }

    #[test]
    fn set_batch_keeps_order_and_values() {
        let shared = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::None);
        let batch = (0..5)
            .map(|index| rgb_sample(1, 2, index as f32 / 10.0))
            .collect::<Vec<_>>();

        canvas.set_batch(&batch);
        assert_eq!(canvas.batch(), batch);

        let mut scope = shared.acquire_scoped();
        canvas.set_batch_unsynchronized(&mut scope, &batch[..2]);
        canvas.set_sample_unsynchronized(&mut scope, batch[4].clone());
        assert_eq!(canvas.batch_in(&scope), vec![batch[4].clone()]);
    }

    #[test]
    fn foreign_scope_is_rejected() {
        let shared = SharedContext::new();
        let other = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::None);

        let mut scope = other.acquire_scoped();
        canvas.set_sample_unsynchronized(&mut scope, rgb_sample(1, 1, 1.0));
        assert!(canvas.batch_in(&scope).is_empty());
        drop(scope);
        assert_eq!(canvas.generation(), 0);
    }

    fn line_endpoints(surface: &RecordingSurface) -> Vec<((f64, f64), (f64, f64))> {
        surface
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn element_rects_and_grid_lines_follow_live_resize() {
        let shared = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::Sample);
        canvas.set_sample(rgb_sample(2, 2, 0.5));
        let mut surface = RecordingSurface::new(40.0, 40.0);

        canvas.render(&mut surface);
        let fills = surface.fills().map(|(rect, _)| rect).collect::<Vec<_>>();
        assert_eq!(
            fills,
            vec![
                Rect::new(0.0, 0.0, 20.0, 20.0),
                Rect::new(20.0, 0.0, 20.0, 20.0),
                Rect::new(0.0, 20.0, 20.0, 20.0),
                Rect::new(20.0, 20.0, 20.0, 20.0),
            ]
        );
        assert_eq!(
            line_endpoints(&surface),
            vec![
                ((0.0, 0.0), (0.0, 40.0)),
                ((20.0, 0.0), (20.0, 40.0)),
                ((40.0, 0.0), (40.0, 40.0)),
                ((0.0, 0.0), (40.0, 0.0)),
                ((0.0, 20.0), (40.0, 20.0)),
                ((0.0, 40.0), (40.0, 40.0)),
            ]
        );

        surface.take_commands();
        surface.resize(80.0, 20.0);
        canvas.render(&mut surface);

        let fills = surface.fills().map(|(rect, _)| rect).collect::<Vec<_>>();
        assert_eq!(
            fills,
            vec![
                Rect::new(0.0, 0.0, 40.0, 10.0),
                Rect::new(40.0, 0.0, 40.0, 10.0),
                Rect::new(0.0, 10.0, 40.0, 10.0),
                Rect::new(40.0, 10.0, 40.0, 10.0),
            ]
        );
        assert_eq!(
            line_endpoints(&surface),
            vec![
                ((0.0, 0.0), (0.0, 20.0)),
                ((40.0, 0.0), (40.0, 20.0)),
                ((80.0, 0.0), (80.0, 20.0)),
                ((0.0, 0.0), (80.0, 0.0)),
                ((0.0, 10.0), (80.0, 10.0)),
                ((0.0, 20.0), (80.0, 20.0)),
            ]
        );
    }

    #[test]
    fn empty_batch_clears_and_presents_only() {
        let shared = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::Both);
        let mut surface = RecordingSurface::new(100.0, 100.0);

        let report = canvas.render(&mut surface);

        assert_eq!(report, FrameReport::default());
        assert_eq!(
            surface.commands(),
            &[DrawCommand::Clear(Rgba::BLACK), DrawCommand::Present]
        );
    }

    #[test]
    fn shallow_samples_are_reported_and_skipped_without_stopping_the_frame() {
        let shared = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::None);
        let gray = Arc::new(Tensor::filled(2, 2, 1, 0.5_f32).expect("shape should fit"));
        canvas.set_batch(&[gray, rgb_sample(2, 2, 0.5)]);
        let mut surface = RecordingSurface::new(40.0, 40.0);

        let first = canvas.render(&mut surface);
        let second = canvas.render(&mut surface);

        assert_eq!(
            first.skipped,
            vec![RenderError::UnsupportedChannelDepth {
                index: 0,
                depth: 1,
                required: 3
            }]
        );
        assert_eq!(first.drawn, 1);
        assert_eq!(second, first);
        assert_eq!(surface.presented_frames(), 2);
        assert_eq!(surface.fills().count(), 2 * 4);
    }

    #[test]
    fn four_samples_tile_two_by_two_with_per_pixel_rectangles() {
        let shared = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::None);
        let mut last = Tensor::zeros(2, 2, 3).expect("shape should fit");
        assert!(last.set(1, 0, 0, 1.0));
        assert!(last.set(1, 0, 2, 0.5));
        canvas.set_batch(&[
            rgb_sample(2, 2, 0.0),
            rgb_sample(2, 2, 0.0),
            rgb_sample(2, 2, 0.0),
            Arc::new(last),
        ]);
        let mut surface = RecordingSurface::new(40.0, 40.0);

        canvas.render(&mut surface);

        let fills = surface.fills().collect::<Vec<_>>();
        assert_eq!(fills.len(), 16);
        // Fourth sample sits in column 1, row 1; its pixel (y=1, x=0) is the 15th fill.
        assert_eq!(
            fills[14],
            (Rect::new(20.0, 30.0, 10.0, 10.0), Rgba::opaque(1.0, 0.0, 0.5))
        );
    }

    #[test]
    fn separate_modes_lay_channels_side_by_side() {
        let shared = SharedContext::new();
        let config = WindowConfig::new("channels")
            .with_channel_display(ChannelDisplay::SeparateColor)
            .with_grid(GridMode::None);
        let window = window(&shared, config);
        let mut sample = Tensor::zeros(1, 2, 3).expect("shape should fit");
        assert!(sample.set(0, 1, 0, 0.25));
        assert!(sample.set(0, 1, 1, 0.5));
        assert!(sample.set(0, 1, 2, 0.75));
        window.canvas().set_sample(Arc::new(sample));
        let mut surface = RecordingSurface::new(60.0, 10.0);

        window.display_handler(&mut surface);
        let separate = surface.take_commands();
        let fills = separate
            .iter()
            .filter_map(|command| match command {
                DrawCommand::FillRect(rect, color) => Some((*rect, *color)),
                _ => None,
            })
            .collect::<Vec<_>>();

        assert_eq!(fills.len(), 6);
        assert!(fills.contains(&(Rect::new(10.0, 0.0, 10.0, 10.0), Rgba::opaque(0.25, 0.0, 0.0))));
        assert!(fills.contains(&(Rect::new(30.0, 0.0, 10.0, 10.0), Rgba::opaque(0.0, 0.5, 0.0))));
        assert!(fills.contains(&(Rect::new(50.0, 0.0, 10.0, 10.0), Rgba::opaque(0.0, 0.0, 0.75))));

        assert!(window.key_handler('c'));
        assert_eq!(window.canvas().channel_display(), ChannelDisplay::SeparateGrayscale);
        window.display_handler(&mut surface);
        assert!(surface
            .fills()
            .any(|fill| fill == (Rect::new(30.0, 0.0, 10.0, 10.0), Rgba::gray(0.5))));

        assert!(window.key_handler('c'));
        surface.take_commands();
        window.display_handler(&mut surface);
        assert_eq!(surface.fills().count(), 2);
    }

    #[test]
    fn grid_modes_select_overlays() {
        let shared = SharedContext::new();
        let config = WindowConfig::new("grids")
            .with_channel_display(ChannelDisplay::SeparateColor)
            .with_grid(GridMode::None);
        let window = window(&shared, config);
        window
            .canvas()
            .set_batch(&[rgb_sample(2, 3, 0.1), rgb_sample(2, 3, 0.2)]);
        let mut surface = RecordingSurface::new(180.0, 20.0);

        window.display_handler(&mut surface);
        assert_eq!(surface.lines().count(), 0);

        assert!(window.key_handler('g'));
        assert_eq!(window.canvas().grid_mode(), GridMode::Sample);
        surface.take_commands();
        window.display_handler(&mut surface);
        // 2 columns × 3 pixels × 3 channels, 1 row × 2 pixels.
        assert_eq!(surface.lines().count(), (18 + 1) + (2 + 1));
        assert!(surface
            .lines()
            .all(|(width, _)| width == SAMPLE_GRID_LINE_WIDTH));

        assert!(window.key_handler('g'));
        surface.take_commands();
        window.display_handler(&mut surface);
        assert_eq!(surface.lines().count(), (2 + 1) + (1 + 1));
        assert!(surface.lines().all(|(width, _)| width == BATCH_GRID_LINE_WIDTH));

        assert!(window.key_handler('g'));
        surface.take_commands();
        window.display_handler(&mut surface);
        assert_eq!(surface.lines().count(), 22 + 5);

        assert!(window.key_handler('g'));
        assert_eq!(window.canvas().grid_mode(), GridMode::None);
    }

    #[test]
    fn mode_keys_cannot_be_registered_twice() {
        let shared = SharedContext::new();
        let mut window = window(&shared, WindowConfig::new("keys"));
        let err = window
            .base
            .keys_mut()
            .register('c', "c - again", || {})
            .expect_err("c is already bound");
        assert!(matches!(err, KeyBindingError::DuplicateKey { key: 'c', .. }));
    }

    #[test]
    fn dropping_every_handle_frees_the_slot() {
        let shared = SharedContext::new();
        let window = window(&shared, WindowConfig::new("short-lived"));
        let producer_handle = window.canvas().clone();
        drop(window);
        producer_handle.set_sample(rgb_sample(1, 1, 1.0));
        assert_eq!(producer_handle.batch().len(), 1);
        drop(producer_handle);
        assert!(format!("{shared:?}").contains("slots: 0"));
    }

    #[test]
    fn concurrent_writer_never_produces_a_torn_frame() {
        let shared = SharedContext::new();
        let canvas = RgbTensorCanvas::<f32>::new(&shared, ChannelDisplay::Rgb, GridMode::None);
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let canvas = canvas.clone();
            let done = done.clone();
            thread::spawn(move || {
                for step in 0..400_usize {
                    let len = step % 7 + 1;
                    let value = len as f32 / 10.0;
                    let batch = (0..len).map(|_| rgb_sample(2, 2, value)).collect::<Vec<_>>();
                    canvas.set_batch(&batch);
                    thread::yield_now();
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let mut surface = RecordingSurface::new(64.0, 64.0);
        let mut frames = 0_usize;
        while !done.load(Ordering::SeqCst) || frames == 0 {
            let report = canvas.render(&mut surface);
            let fills = surface.fills().collect::<Vec<_>>();
            surface.take_commands();
            frames += 1;
            if report.samples == 0 {
                assert!(fills.is_empty());
                continue;
            }

            assert_eq!(report.drawn, report.samples);
            assert_eq!(fills.len(), report.samples * 4, "frame {frames} was torn");
            let color = fills[0].1;
            assert!(fills.iter().all(|(_, fill)| *fill == color));
            let written_len = (color.r * 10.0).round() as usize;
            assert_eq!(written_len, report.samples, "frame {frames} mixed two batches");
        }

        writer.join().expect("writer should finish");
        assert_eq!(canvas.generation(), 400);
    }
}

use serde::Deserialize;

use crate::geometry::{WindowPosition, WindowSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelDisplay {
    SeparateColor,
    SeparateGrayscale,
    #[default]
    Rgb,
}

impl ChannelDisplay {
    const ALL: [Self; 3] = [Self::SeparateColor, Self::SeparateGrayscale, Self::Rgb];

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }

    /// Horizontal cells drawn per tensor pixel.
    pub fn channel_columns(self) -> usize {
        match self {
            Self::SeparateColor | Self::SeparateGrayscale => 3,
            Self::Rgb => 1,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SeparateColor => {
                "Displays separate channels, colored according to the channel type (R/G/B)"
            }
            Self::SeparateGrayscale => "Displays separate channels, all in grayscale",
            Self::Rgb => "Displays RGB image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridMode {
    None,
    Sample,
    #[default]
    Batch,
    Both,
}

impl GridMode {
    const ALL: [Self; 4] = [Self::None, Self::Sample, Self::Batch, Self::Both];

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }

    pub fn draws_sample_grid(self) -> bool {
        matches!(self, Self::Sample | Self::Both)
    }

    pub fn draws_batch_grid(self) -> bool {
        matches!(self, Self::Batch | Self::Both)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::None => "Display no grid",
            Self::Sample => "Display only grid dividing sample cells",
            Self::Batch => "Display grid dividing samples",
            Self::Both => "Display both sample and batch grids",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleNormalization {
    #[default]
    None,
    HotCold,
}

impl GrayscaleNormalization {
    const ALL: [Self; 2] = [Self::None, Self::HotCold];

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self)
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::None => "Display original values, clamped to <0,1>",
            Self::HotCold => "Display positive values in red and negative values in blue",
        }
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let index = all.iter().position(|mode| *mode == current).unwrap_or(0);
    all[(index + 1) % all.len()]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub name: String,
    pub channel_display: ChannelDisplay,
    pub normalization: GrayscaleNormalization,
    pub grid: GridMode,
    pub position: WindowPosition,
    pub size: WindowSize,
}

impl WindowConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_channel_display(mut self, channel_display: ChannelDisplay) -> Self {
        self.channel_display = channel_display;
        self
    }

    pub fn with_normalization(mut self, normalization: GrayscaleNormalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_grid(mut self, grid: GridMode) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = WindowPosition::new(x, y);
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.size = WindowSize::new(width, height);
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            name: "TensorWindow".to_string(),
            channel_display: ChannelDisplay::default(),
            normalization: GrayscaleNormalization::default(),
            grid: GridMode::default(),
            position: WindowPosition::default(),
            size: WindowSize::default(),
        }
    }
}

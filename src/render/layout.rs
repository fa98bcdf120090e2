//! Tiling of an N-sample batch onto a near-square grid of sample cells.

/// Smallest `r` with `r * r >= n`, computed without float rounding surprises.
pub fn ceil_sqrt(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut root = (n as f64).sqrt() as usize;
    while root.saturating_mul(root) < n {
        root += 1;
    }
    while root > 1 && (root - 1) * (root - 1) >= n {
        root -= 1;
    }
    root
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub index: usize,
    pub column: usize,
    pub row: usize,
}

/// `columns = ceil(sqrt(N))`, `rows = ceil(N / columns)`; the last row may be partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchGrid {
    pub columns: usize,
    pub rows: usize,
    len: usize,
}

impl BatchGrid {
    pub fn for_len(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let columns = ceil_sqrt(len);
        let rows = len.div_ceil(columns);
        Some(Self { columns, rows, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        let columns = self.columns;
        (0..self.rows)
            .flat_map(move |row| (0..columns).map(move |column| (row, column)))
            .map(move |(row, column)| GridCell {
                index: row * columns + column,
                column,
                row,
            })
            .take_while(|cell| cell.index < self.len)
    }
}

/// Screen extent of one tensor element, recomputed from the live surface size every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    pub x: f64,
    pub y: f64,
}

impl PixelScale {
    /// `channel_columns` is 3 when every pixel is split into three side-by-side channels.
    pub fn compute(
        surface_width: f64,
        surface_height: f64,
        grid: &BatchGrid,
        sample_height: usize,
        sample_width: usize,
        channel_columns: usize,
    ) -> Option<Self> {
        let tiled_width = sample_width * grid.columns * channel_columns;
        let tiled_height = sample_height * grid.rows;
        if tiled_width == 0 || tiled_height == 0 {
            return None;
        }
        Some(Self {
            x: surface_width / tiled_width as f64,
            y: surface_height / tiled_height as f64,
        })
    }
}

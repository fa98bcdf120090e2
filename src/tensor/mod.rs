//! Planar H×W×D tensors shared between producers and canvases.

use std::sync::Arc;

use thiserror::Error;

pub type TensorResult<T> = std::result::Result<T, TensorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    #[error("tensor data length {actual} does not match shape {height}x{width}x{depth}")]
    ShapeMismatch {
        height: usize,
        width: usize,
        depth: usize,
        actual: usize,
    },
    #[error("tensor shape {height}x{width}x{depth} has more elements than fit in memory")]
    TooManyElements {
        height: usize,
        width: usize,
        depth: usize,
    },
}

fn element_count(height: usize, width: usize, depth: usize) -> Option<usize> {
    height.checked_mul(width)?.checked_mul(depth)
}

/// Numeric element types a canvas knows how to turn into color intensities.
pub trait Element: Copy + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    fn intensity(self) -> f64;

    fn from_intensity(value: f64) -> Self;
}

impl Element for f32 {
    fn intensity(self) -> f64 {
        f64::from(self)
    }

    fn from_intensity(value: f64) -> Self {
        value as f32
    }
}

impl Element for f64 {
    fn intensity(self) -> f64 {
        self
    }

    fn from_intensity(value: f64) -> Self {
        value
    }
}

/// A height × width × depth array stored channel after channel, each channel row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    height: usize,
    width: usize,
    depth: usize,
    data: Vec<T>,
}

impl<T: Element> Tensor<T> {
    pub fn zeros(height: usize, width: usize, depth: usize) -> TensorResult<Self> {
        Self::filled(height, width, depth, T::from_intensity(0.0))
    }

    pub fn filled(height: usize, width: usize, depth: usize, value: T) -> TensorResult<Self> {
        let len = element_count(height, width, depth).ok_or(TensorError::TooManyElements {
            height,
            width,
            depth,
        })?;
        Ok(Self {
            height,
            width,
            depth,
            data: vec![value; len],
        })
    }

    pub fn from_planar(
        height: usize,
        width: usize,
        depth: usize,
        data: Vec<T>,
    ) -> TensorResult<Self> {
        if element_count(height, width, depth) != Some(data.len()) {
            return Err(TensorError::ShapeMismatch {
                height,
                width,
                depth,
                actual: data.len(),
            });
        }
        Ok(Self {
            height,
            width,
            depth,
            data,
        })
    }

    pub fn matrix(height: usize, width: usize, data: Vec<T>) -> TensorResult<Self> {
        Self::from_planar(height, width, 1, data)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn offset(&self, y: usize, x: usize, channel: usize) -> Option<usize> {
        if y >= self.height || x >= self.width || channel >= self.depth {
            return None;
        }
        Some(channel * self.height * self.width + y * self.width + x)
    }

    pub fn get(&self, y: usize, x: usize, channel: usize) -> Option<T> {
        self.offset(y, x, channel).map(|index| self.data[index])
    }

    pub fn set(&mut self, y: usize, x: usize, channel: usize, value: T) -> bool {
        match self.offset(y, x, channel) {
            Some(index) => {
                self.data[index] = value;
                true
            }
            None => false,
        }
    }
}

pub type Batch<T> = Vec<Arc<Tensor<T>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_planar_rejects_length_mismatch() {
        let err = Tensor::<f32>::from_planar(2, 2, 3, vec![0.0; 11])
            .expect_err("11 values cannot fill a 2x2x3 tensor");
        assert_eq!(
            err,
            TensorError::ShapeMismatch {
                height: 2,
                width: 2,
                depth: 3,
                actual: 11
            }
        );
    }

    #[test]
    fn planar_layout_places_channels_after_each_other() {
        let data = (0..12).map(|value| value as f32).collect::<Vec<_>>();
        let tensor = Tensor::from_planar(2, 2, 3, data).expect("shape should match");

        assert_eq!(tensor.get(0, 0, 0), Some(0.0));
        assert_eq!(tensor.get(1, 1, 0), Some(3.0));
        assert_eq!(tensor.get(0, 1, 1), Some(5.0));
        assert_eq!(tensor.get(1, 0, 2), Some(10.0));
        assert_eq!(tensor.get(2, 0, 0), None);
        assert_eq!(tensor.get(0, 0, 3), None);
    }

    #[test]
    fn set_writes_only_inside_bounds() {
        let mut tensor = Tensor::<f64>::zeros(3, 5, 1).expect("shape should fit");
        assert!(tensor.set(2, 4, 0, 1.0));
        assert!(!tensor.set(3, 0, 0, 1.0));
        assert_eq!(tensor.get(2, 4, 0), Some(1.0));
        assert_eq!(tensor.shape(), (3, 5, 1));
    }

    #[test]
    fn overflowing_shapes_are_rejected_instead_of_wrapping() {
        let height = usize::MAX / 2 + 1;

        let err = Tensor::<f32>::from_planar(height, 2, 1, Vec::new())
            .expect_err("the element count overflows usize");
        assert_eq!(
            err,
            TensorError::ShapeMismatch {
                height,
                width: 2,
                depth: 1,
                actual: 0
            }
        );

        assert!(matches!(
            Tensor::<f32>::zeros(height, 2, 1),
            Err(TensorError::TooManyElements { width: 2, depth: 1, .. })
        ));
        assert!(matches!(
            Tensor::filled(2, usize::MAX, 2, 1.0_f64),
            Err(TensorError::TooManyElements { .. })
        ));
    }
}

//! Loads image files into planar RGB tensors for producers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::GenericImageView;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::tensor::{Batch, Element, Tensor, TensorError};

pub type ImportResult<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no image paths given")]
    NoPaths,
    #[error("failed to read image {path}: {message}")]
    ImageReadFailed { path: PathBuf, message: String },
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

pub fn split_path_list(list: &str) -> Vec<PathBuf> {
    list.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Every image decoded up front, each as an H×W×3 tensor with values in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ImageImporter<T> {
    samples: Batch<T>,
}

impl<T: Element> ImageImporter<T> {
    pub fn from_path_list(list: &str) -> ImportResult<Self> {
        Self::from_paths(split_path_list(list))
    }

    pub fn from_paths<I, P>(paths: I) -> ImportResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let samples = paths
            .into_iter()
            .map(|path| load_image(path.as_ref()).map(Arc::new))
            .collect::<ImportResult<Batch<T>>>()?;
        if samples.is_empty() {
            return Err(ImportError::NoPaths);
        }
        tracing::info!(count = samples.len(), "imported images");
        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[Arc<Tensor<T>>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn random_sample(&self) -> Option<Arc<Tensor<T>>> {
        self.random_sample_with(&mut rand::thread_rng())
    }

    pub fn random_sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Arc<Tensor<T>>> {
        self.samples.choose(rng).cloned()
    }
}

pub fn load_image<T: Element>(path: &Path) -> ImportResult<Tensor<T>> {
    let image = image::open(path).map_err(|err| ImportError::ImageReadFailed {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let (width, height) = image.dimensions();
    let (width, height) = (width as usize, height as usize);
    let rgb = image.to_rgb8();

    let mut tensor = Tensor::zeros(height, width, 3)?;
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for (channel, value) in pixel.0.iter().enumerate() {
            tensor.set(
                y as usize,
                x as usize,
                channel,
                T::from_intensity(f64::from(*value) / 255.0),
            );
        }
    }
    tracing::debug!(path = %path.display(), height, width, "decoded image");
    Ok(tensor)
}

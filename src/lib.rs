pub mod app;
pub mod canvas;
pub mod config;
pub mod error;
pub mod geometry;
pub mod import;
pub mod input;
pub mod logging;
pub mod producer;
pub mod render;
pub mod state;
pub mod tensor;
pub mod window;
pub use error::{AppError, AppResult};

pub mod inference;
pub mod model_manager;

use crate::error::AppError;
use ndarray::Array4;

/// Scores a preprocessed `(1, 224, 224, 3)` tensor into a probability.
pub trait Classifier {
    fn score(&self, input: Array4<f32>) -> Result<f32, AppError>;
}

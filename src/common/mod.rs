//! Prediction modes, predictors and transforms shared by the decision core

pub mod prediction;
/// DCT/IDCT and WHT transform functions
pub mod transform;
pub mod types;

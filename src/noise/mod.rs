//! Random sources used by the channel models.

mod gaussian;

pub use gaussian::GaussianNoise;

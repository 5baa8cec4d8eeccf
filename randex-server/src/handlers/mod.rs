//! Request handlers

pub mod health;
pub mod sample;

pub use health::health;
pub use sample::{sample_handler, SampleResponse};

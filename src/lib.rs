pub mod config;
pub mod constants;
pub mod error;
pub mod fixed;
pub mod mac;
pub mod mandelbrot;
pub mod output;

pub use config::SimConfig;
pub use error::{Result, SimError};
pub use fixed::{FixedFormat, FixedPoint};

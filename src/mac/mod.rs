pub mod design;
pub mod engine;
pub mod reference;

pub use design::{design_lowpass, scale_coefficients};
pub use engine::MacEngine;
pub use reference::ReferenceFir;

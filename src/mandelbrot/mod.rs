pub mod datapath;
pub mod iterate;
pub mod viewport;

pub use datapath::{Datapath, FixedDatapath, FloatDatapath};
pub use iterate::{EscapeParams, escape_time, escape_time_at, step};
pub use viewport::{EscapeGrid, Viewport, linspace, render};

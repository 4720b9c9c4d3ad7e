pub mod bits;
pub mod format;
pub mod value;

pub use format::{FixedFormat, group_nibbles};
pub use value::{FixedPoint, SetOutcome, Source};

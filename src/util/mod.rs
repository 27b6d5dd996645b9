// Shared numeric and color utilities

pub mod hsl;
pub mod math;

pub use hsl::{blend, wrap_hue, Hsl};

//! Domain models for the Astral Insights platform

mod birth;
mod chart;
mod forecast;

pub use birth::*;
pub use chart::*;
pub use forecast::*;

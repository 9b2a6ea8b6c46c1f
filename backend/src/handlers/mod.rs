//! HTTP request handlers

pub mod birth_data;
pub mod charts;
pub mod forecast;
pub mod health;

pub use birth_data::*;
pub use charts::*;
pub use forecast::*;
pub use health::*;

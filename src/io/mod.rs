//! Output sinks.
//!
//! - tab-separated report exports (`export`)

pub mod export;

pub use export::*;

//! Presentation of report rows: cell formatting and terminal tables.

pub mod format;

pub use format::*;

//! Command modules for the inspect2hgdb CLI

pub mod convert;
pub mod preview;

pub use convert::convert_to;
pub use preview::print_preview;

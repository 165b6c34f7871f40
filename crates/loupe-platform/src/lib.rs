//! loupe-platform: where loupe keeps its files.

pub mod error;
pub mod paths;

pub use error::PlatformError;
pub use paths::{DefaultPaths, FixedPaths, PlatformPaths};

pub mod types;

// Re-export public types
pub use types::{DelimiterMode, ResultCaps, Settings};

pub mod lora;
pub mod tags;

// Re-export public types
pub use lora::LoraHit;
pub use tags::{TagHit, TagMatch};

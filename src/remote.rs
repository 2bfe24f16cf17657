pub mod client;
pub mod debouncer;
pub mod worker;

// Re-export public types
pub use client::{RemoteClient, RemoteTag, TagSearchBackend};
pub use debouncer::Debouncer;
pub use worker::{RemoteRequest, RemoteResponse, RemoteSearch};

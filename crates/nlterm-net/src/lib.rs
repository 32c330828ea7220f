//! Network backends for nlterm.
//!
//! Provides the HTTPS text-generation backend used by the remote
//! natural-language strategy. Requests are blocking, matching the
//! single-threaded dispatch loop.

pub mod gemini;

/// Google Generative Language API backend.
pub use gemini::GeminiBackend;

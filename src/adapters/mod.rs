// Adapters layer: concrete implementations for external systems (generation backend, document storage).

pub mod docs;
pub mod gemini;

pub use docs::FileArchitectureDoc;
pub use gemini::GeminiBackend;

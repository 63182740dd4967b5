pub mod cleanup;
pub mod invoker;

pub use crate::domain::model::{BackendInvocation, ConversionRequest, ConversionResult};
pub use crate::domain::ports::GenerationBackend;
pub use crate::utils::error::Result;

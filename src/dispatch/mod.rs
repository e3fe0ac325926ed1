//! Dispatch and fallback.
//!
//! The engine resolves a primary and optional fallback gateway through an
//! explicitly chosen [`DispatchPolicy`], sends through the primary and, when
//! the [`FailureClassifier`] deems the failure retryable, makes exactly one
//! more attempt through the fallback.

mod classifier;
mod engine;
mod error;
mod policy;
mod registry;

pub use classifier::FailureClassifier;
pub use engine::{Attempt, BulkFallbackResult, EngineBuilder, FallbackEngine, FallbackResult};
pub use error::DispatchError;
pub use policy::DispatchPolicy;
pub use registry::GatewayRegistry;

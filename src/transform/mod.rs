//! Variant computation
//!
//! The engine that produces pixels sits behind a trait so the request
//! pipeline can be exercised against fakes; the invoker owns persistence
//! and the degrade-to-source failure policy around it.

pub mod engine;
pub mod invoker;

pub use engine::{RasterEngine, TransformEngine, TransformSpec};
pub use invoker::invoke;

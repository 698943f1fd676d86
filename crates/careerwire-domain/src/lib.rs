//! Careerwire Domain Layer
//!
//! Data model shared by every other crate in the workspace. Nothing here
//! performs I/O; the types only describe what flows through the pipeline.
//!
//! ## Key Concepts
//!
//! - **InputRecord**: one scraped post, read-only for the whole pipeline
//! - **ChangeRecord**: one (person, organization, new role) triple
//! - **ExtractionResult**: the per-post scratch value produced by the model
//! - **OutputRecord**: the externally visible unit, one or more per input
//!
//! ## Ownership
//!
//! An `ExtractionResult` and its `ChangeRecord`s are owned by the processing
//! of exactly one input record and are never shared across tasks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extraction;
pub mod record;

// Re-exports for convenience
pub use extraction::{ChangeRecord, ExtractionResult, UNKNOWN};
pub use record::{Classification, InputRecord, OutputRecord};

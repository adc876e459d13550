//! Core staging for the rustro launcher
//!
//! Resolves collision-free destinations for candidate cores and stages
//! them into the private executable directory with an atomic publish.

pub mod paths;
pub mod stager;

pub use paths::{CoreReference, StagingTarget};
pub use stager::{CoreStager, StagedOutcome};

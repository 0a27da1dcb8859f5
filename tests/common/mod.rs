//! Common test infrastructure
//!
//! Integration tests write small CSV inputs to a scratch directory, run the
//! pipeline against a stubbed metadata lookup and inspect the resulting
//! SQLite file directly.

#![allow(dead_code)]

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::{run_pipeline, PipelineRun, StubLookup, TestInputs};

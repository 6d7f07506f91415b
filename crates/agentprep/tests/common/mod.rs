//! Shared test utilities for agentprep integration tests.
//!
//! - Builders for use cases and metrics
//! - A fully populated catalog fixture
//! - `ScriptedApi`, a primary that always fails with a chosen error

pub mod builders;
pub mod scripted;

pub use builders::*;
pub use scripted::ScriptedApi;

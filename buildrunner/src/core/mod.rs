//! Deterministic, pure logic shared by the task runner.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! artifacts and task definitions and return deterministic outputs suitable
//! for tests.

pub mod artifact;
pub mod concat;
pub mod invariants;
pub mod registry;
pub mod task;

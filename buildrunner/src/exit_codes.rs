//! Stable exit codes for buildrunner CLI commands.

/// Every requested task completed.
pub const OK: i32 = 0;
/// A task failed, a task name was unknown, or the configuration was invalid.
pub const FAILED: i32 = 1;

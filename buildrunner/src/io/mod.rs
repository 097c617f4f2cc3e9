//! I/O helpers for buildrunner commands.

pub mod closure;
pub mod config;
pub mod process;
pub mod sink;
pub mod sources;
pub mod transpiler;

//! Build-pipeline task runner for the koheron websocket client.
//!
//! Each task is a linear pipeline: select sources, then run a fixed list of
//! stages (concat, transpile, optimize, dest) over the in-memory artifacts.
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (artifacts, concatenation, task
//!   definitions, registry). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, configuration, external
//!   transpiler and optimizer processes). Behind traits so tests can inject fakes.
//!
//! [`pipeline`] coordinates core logic with I/O to implement the `run` command.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod pipeline;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

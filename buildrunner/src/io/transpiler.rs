//! Transpiler abstraction for CoffeeScript compilation.
//!
//! The [`Transpiler`] trait decouples pipeline execution from the actual
//! compiler (currently `coffee --compile --stdio`). Tests use fakes that
//! transform text without spawning processes.

use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};

use crate::io::process::run_command_with_timeout;

/// One whole-file compilation.
#[derive(Debug, Clone)]
pub struct TranspileRequest<'a> {
    /// Artifact name, used in diagnostics.
    pub name: &'a str,
    pub source: &'a str,
    /// Omit the top-level function safety wrapper.
    pub bare: bool,
}

/// Abstraction over CoffeeScript compilers.
pub trait Transpiler {
    /// Compile `request.source` and return the JavaScript text.
    fn transpile(&self, request: &TranspileRequest<'_>) -> Result<String>;
}

/// Transpiler that spawns the `coffee` CLI, source on stdin, JavaScript on stdout.
#[derive(Debug, Clone)]
pub struct CoffeeTranspiler {
    pub command: Vec<String>,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

impl Transpiler for CoffeeTranspiler {
    #[instrument(skip_all, fields(name = request.name, bare = request.bare))]
    fn transpile(&self, request: &TranspileRequest<'_>) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("transpiler command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        if request.bare {
            cmd.arg("--bare");
        }

        let output = run_command_with_timeout(
            cmd,
            Some(request.source.as_bytes()),
            self.timeout,
            self.output_limit_bytes,
        )
        .with_context(|| format!("run {program}"))?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "transpiler timed out");
            return Err(anyhow!(
                "{program} timed out after {:?} compiling {}",
                self.timeout,
                request.name
            ));
        }
        if !output.succeeded() {
            warn!(exit_code = ?output.status.code(), "transpiler failed");
            return Err(anyhow!("{}", output.stderr_text()))
                .with_context(|| format!("{program} failed to compile {}", request.name));
        }

        let javascript = output.stdout_text()?;
        debug!(bytes = javascript.len(), "transpiled");
        Ok(javascript)
    }
}

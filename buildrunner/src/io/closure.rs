//! Optimizer abstraction for the Google Closure Compiler.
//!
//! The [`Optimizer`] trait decouples pipeline execution from the `java -jar
//! compiler.jar` invocation. Tests use fakes that record their inputs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, instrument, warn};

use crate::core::artifact::Artifact;
use crate::core::task::ClosureOptions;
use crate::io::process::run_command_with_timeout;

/// Abstraction over minifying/type-checking compilers.
pub trait Optimizer {
    /// Compile `inputs` (in order) into one artifact named `options.file_name`.
    fn optimize(&self, inputs: &[Artifact], options: &ClosureOptions) -> Result<Artifact>;
}

/// Optimizer that runs `compiler.jar` through a Java launcher.
#[derive(Debug, Clone)]
pub struct ClosureCompiler {
    /// Java launcher plus any JVM options (`["java"]` by default).
    pub java: Vec<String>,
    /// Project root; relative `compiler_path`s resolve against it.
    pub root: PathBuf,
    pub timeout: Duration,
    pub output_limit_bytes: usize,
}

impl ClosureCompiler {
    fn compiler_path(&self, options: &ClosureOptions) -> PathBuf {
        if options.compiler_path.is_absolute() {
            options.compiler_path.clone()
        } else {
            self.root.join(&options.compiler_path)
        }
    }

    fn build_command(
        &self,
        options: &ClosureOptions,
        input_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<Command> {
        let (program, jvm_args) = self
            .java
            .split_first()
            .ok_or_else(|| anyhow!("java command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(jvm_args)
            .arg("-jar")
            .arg(self.compiler_path(options))
            .args(options.compiler_flags.to_args());
        for path in input_paths {
            cmd.arg("--js").arg(path);
        }
        cmd.arg("--js_output_file")
            .arg(output_path)
            .current_dir(&self.root);
        Ok(cmd)
    }
}

impl Optimizer for ClosureCompiler {
    #[instrument(skip_all, fields(file_name = %options.file_name, inputs = inputs.len()))]
    fn optimize(&self, inputs: &[Artifact], options: &ClosureOptions) -> Result<Artifact> {
        let compiler_path = self.compiler_path(options);
        if !compiler_path.exists() {
            bail!("missing closure compiler {}", compiler_path.display());
        }

        let workdir = tempfile::Builder::new()
            .prefix("buildrunner-closure-")
            .tempdir()
            .context("create closure compiler workdir")?;
        let mut input_paths = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let path = workdir.path().join(format!("{index:03}-{}", input.name));
            fs::write(&path, &input.contents)
                .with_context(|| format!("write compiler input {}", path.display()))?;
            input_paths.push(path);
        }
        let output_path = workdir.path().join(&options.file_name);

        let cmd = self.build_command(options, &input_paths, &output_path)?;
        info!(compiler = %compiler_path.display(), "starting closure compiler");
        let output = run_command_with_timeout(cmd, None, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run {} -jar {}", self.java.join(" "), compiler_path.display()))?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "closure compiler timed out");
            return Err(anyhow!(
                "closure compiler timed out after {:?} building {}",
                self.timeout,
                options.file_name
            ));
        }
        let diagnostics = output.stderr_text();
        if !output.succeeded() {
            warn!(exit_code = ?output.status.code(), "closure compiler failed");
            return Err(anyhow!("{diagnostics}"))
                .with_context(|| format!("closure compiler failed to build {}", options.file_name));
        }
        if !diagnostics.is_empty() {
            if !options.continue_with_warnings {
                return Err(anyhow!("{diagnostics}")).with_context(|| {
                    format!("closure compiler reported warnings for {}", options.file_name)
                });
            }
            warn!(file_name = %options.file_name, "closure compiler warnings:\n{diagnostics}");
        }

        let contents = fs::read_to_string(&output_path)
            .with_context(|| format!("read compiler output {}", output_path.display()))?;
        debug!(bytes = contents.len(), "closure compiler completed successfully");
        Ok(Artifact::new(options.file_name.clone(), contents))
    }
}

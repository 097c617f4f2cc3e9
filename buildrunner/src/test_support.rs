//! Test-only fakes for the external tools and a temporary project layout.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::artifact::Artifact;
use crate::core::task::ClosureOptions;
use crate::io::closure::Optimizer;
use crate::io::transpiler::{TranspileRequest, Transpiler};
use crate::pipeline::{PipelineContext, PipelineOptions};

/// Marker that makes [`FakeTranspiler`] report a syntax error on that line.
pub const SYNTAX_ERROR_MARKER: &str = "!!";

/// Deterministic stand-in for `coffee`: each non-empty line becomes a
/// statement terminated by `;`. A line starting with [`SYNTAX_ERROR_MARKER`]
/// fails with a coffee-style diagnostic.
#[derive(Default)]
pub struct FakeTranspiler {
    requests: RefCell<Vec<(String, bool)>>,
}

impl FakeTranspiler {
    /// Recorded `(name, bare)` for every call, in call order.
    pub fn requests(&self) -> Vec<(String, bool)> {
        self.requests.borrow().clone()
    }
}

impl Transpiler for FakeTranspiler {
    fn transpile(&self, request: &TranspileRequest<'_>) -> Result<String> {
        self.requests
            .borrow_mut()
            .push((request.name.to_string(), request.bare));
        let mut out = String::new();
        for (index, line) in request.source.lines().enumerate() {
            let line = line.trim();
            if line.starts_with(SYNTAX_ERROR_MARKER) {
                return Err(anyhow!(
                    "[stdin]:{}:1: error: unexpected !",
                    index + 1
                ));
            }
            if !line.is_empty() {
                out.push_str(line);
                out.push_str(";\n");
            }
        }
        Ok(out)
    }
}

/// Stand-in for Closure Compiler: joins inputs with all whitespace removed
/// and records each call as `(input names, file_name)`.
#[derive(Default)]
pub struct RecordingOptimizer {
    calls: RefCell<Vec<(Vec<String>, String)>>,
    failure: Option<String>,
}

impl RecordingOptimizer {
    /// An optimizer that always fails with `diagnostics`.
    pub fn failing(diagnostics: &str) -> Self {
        Self {
            calls: RefCell::default(),
            failure: Some(diagnostics.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<(Vec<String>, String)> {
        self.calls.borrow().clone()
    }
}

impl Optimizer for RecordingOptimizer {
    fn optimize(&self, inputs: &[Artifact], options: &ClosureOptions) -> Result<Artifact> {
        self.calls.borrow_mut().push((
            inputs.iter().map(|artifact| artifact.name.clone()).collect(),
            options.file_name.clone(),
        ));
        if let Some(diagnostics) = &self.failure {
            return Err(anyhow!("{diagnostics}"));
        }
        let minified: String = inputs
            .iter()
            .flat_map(|artifact| artifact.contents.chars())
            .filter(|c| !c.is_whitespace())
            .collect();
        Ok(Artifact::new(options.file_name.clone(), minified))
    }
}

/// A throwaway project root.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write project file");
    }

    /// Read `relative`, or `None` when the file does not exist.
    pub fn read(&self, relative: &str) -> Option<String> {
        fs::read_to_string(self.path().join(relative)).ok()
    }

    /// Context with default options over this project.
    pub fn context<'a, T: Transpiler, O: Optimizer>(
        &'a self,
        transpiler: &'a T,
        optimizer: &'a O,
    ) -> PipelineContext<'a, T, O> {
        PipelineContext {
            root: self.path(),
            transpiler,
            optimizer,
            options: PipelineOptions::default(),
        }
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

//! Orchestration for running registered tasks.
//!
//! Each task runs as a batch: all sources are read, then every stage consumes
//! the full artifact list produced by the previous one. The first error aborts
//! the task; files written by earlier dest stages are left in place.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, info_span, instrument, warn};

use crate::core::artifact::Artifact;
use crate::core::concat::concat;
use crate::core::registry::TaskRegistry;
use crate::core::task::{Stage, TaskDef};
use crate::io::closure::Optimizer;
use crate::io::config::BuildConfig;
use crate::io::sink::write_artifacts;
use crate::io::sources::select_sources;
use crate::io::transpiler::{TranspileRequest, Transpiler};

/// Extension given to transpiled artifacts.
const JS_EXTENSION: &str = "js";

/// Knobs that change how stages behave, independent of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Fail when a task's source glob matches nothing.
    pub fail_on_empty: bool,
    /// `bare` for transpile stages that leave it unset.
    pub default_bare: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fail_on_empty: false,
            default_bare: false,
        }
    }
}

impl From<&BuildConfig> for PipelineOptions {
    fn from(cfg: &BuildConfig) -> Self {
        Self {
            fail_on_empty: cfg.fail_on_empty,
            default_bare: cfg.transpiler.bare,
        }
    }
}

/// Everything a task needs besides its definition.
pub struct PipelineContext<'a, T: Transpiler, O: Optimizer> {
    /// Project root; globs and dest directories are relative to it.
    pub root: &'a Path,
    pub transpiler: &'a T,
    pub optimizer: &'a O,
    pub options: PipelineOptions,
}

/// Result of one task invocation.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub name: String,
    /// Files written by dest stages, in write order.
    pub written: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Run a single task definition to completion.
#[instrument(skip_all, fields(task = %task.name))]
pub fn run_task<T: Transpiler, O: Optimizer>(
    task: &TaskDef,
    ctx: &PipelineContext<'_, T, O>,
) -> Result<TaskOutcome> {
    let start = Instant::now();
    info!(src = %task.src, stages = task.stages.len(), "starting task");

    let mut artifacts = select_sources(ctx.root, &task.src)
        .with_context(|| format!("{}: select {}", task.name, task.src))?;
    if artifacts.is_empty() {
        if ctx.options.fail_on_empty {
            bail!("{}: no files match {}", task.name, task.src);
        }
        warn!(src = %task.src, "no source files matched");
    }

    let mut written = Vec::new();
    for stage in &task.stages {
        let label = stage.label();
        let _span = info_span!("stage", stage = %label).entered();
        artifacts = run_stage(stage, artifacts, ctx, &mut written)
            .with_context(|| format!("{}: {}", task.name, label))?;
        debug!(artifacts = artifacts.len(), "stage finished");
    }

    let elapsed = start.elapsed();
    info!(written = written.len(), elapsed_ms = elapsed.as_millis() as u64, "finished task");
    Ok(TaskOutcome {
        name: task.name.clone(),
        written,
        elapsed,
    })
}

fn run_stage<T: Transpiler, O: Optimizer>(
    stage: &Stage,
    artifacts: Vec<Artifact>,
    ctx: &PipelineContext<'_, T, O>,
    written: &mut Vec<PathBuf>,
) -> Result<Vec<Artifact>> {
    match stage {
        Stage::Concat(file_name) => Ok(concat(file_name, &artifacts)),
        Stage::Transpile(options) => {
            let bare = options.bare.unwrap_or(ctx.options.default_bare);
            artifacts
                .iter()
                .map(|artifact| transpile_artifact(ctx.transpiler, artifact, bare))
                .collect()
        }
        Stage::Dest(dir) => {
            written.extend(write_artifacts(ctx.root, dir, &artifacts)?);
            Ok(artifacts)
        }
        Stage::Optimize(options) => {
            if artifacts.is_empty() {
                debug!("nothing to optimize");
                return Ok(artifacts);
            }
            Ok(vec![ctx.optimizer.optimize(&artifacts, options)?])
        }
    }
}

fn transpile_artifact<T: Transpiler>(
    transpiler: &T,
    artifact: &Artifact,
    bare: bool,
) -> Result<Artifact> {
    let javascript = transpiler
        .transpile(&TranspileRequest {
            name: &artifact.name,
            source: &artifact.contents,
            bare,
        })
        .with_context(|| format!("transpile {}", artifact.name))?;
    let mut out = artifact.with_extension(JS_EXTENSION);
    out.contents = javascript;
    Ok(out)
}

/// Run `names` in the given order, stopping at the first failure.
///
/// Unknown names are rejected before any task runs. `on_finished` sees each
/// outcome as soon as its task completes.
pub fn run_tasks<T: Transpiler, O: Optimizer>(
    registry: &TaskRegistry,
    names: &[String],
    ctx: &PipelineContext<'_, T, O>,
    mut on_finished: impl FnMut(&TaskOutcome),
) -> Result<Vec<TaskOutcome>> {
    let tasks = names
        .iter()
        .map(|name| {
            registry.get(name).ok_or_else(|| {
                anyhow!(
                    "unknown task '{}' (known tasks: {})",
                    name,
                    registry.names().collect::<Vec<_>>().join(", ")
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut outcomes = Vec::with_capacity(tasks.len());
    for task in tasks {
        let outcome = run_task(task, ctx)?;
        on_finished(&outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::{COMPILE_LIB_JS, TranspileOptions};
    use crate::test_support::{FakeTranspiler, RecordingOptimizer, TestProject};

    #[test]
    fn transpile_renames_to_js() {
        let transpiler = FakeTranspiler::default();
        let out = transpile_artifact(&transpiler, &Artifact::new("math.coffee", "x"), true)
            .expect("transpile");
        assert_eq!(out.name, "math.js");
        assert_eq!(out.contents, "x;\n");
        assert_eq!(transpiler.requests(), vec![("math.coffee".to_string(), true)]);
    }

    #[test]
    fn stage_bare_overrides_default() {
        let project = TestProject::new();
        project.write("src/a.coffee", "a = 1");
        let transpiler = FakeTranspiler::default();
        let optimizer = RecordingOptimizer::default();
        let ctx = PipelineContext {
            root: project.path(),
            transpiler: &transpiler,
            optimizer: &optimizer,
            options: PipelineOptions {
                default_bare: true,
                ..PipelineOptions::default()
            },
        };
        let task = TaskDef {
            name: "t".to_string(),
            src: "src/*.coffee".to_string(),
            stages: vec![
                Stage::Transpile(TranspileOptions { bare: Some(false) }),
                Stage::Transpile(TranspileOptions::default()),
            ],
        };
        run_task(&task, &ctx).expect("run");
        let bare_flags: Vec<bool> = transpiler.requests().iter().map(|r| r.1).collect();
        assert_eq!(bare_flags, vec![false, true]);
    }

    #[test]
    fn unknown_task_lists_known_names_and_runs_nothing() {
        let project = TestProject::new();
        project.write("tests/math.coffee", "m = 1");
        let transpiler = FakeTranspiler::default();
        let optimizer = RecordingOptimizer::default();
        let ctx = project.context(&transpiler, &optimizer);
        let registry = TaskRegistry::with_builtin_tasks();
        let names = vec!["compile-math-js".to_string(), "compile-everything".to_string()];

        let err = run_tasks(&registry, &names, &ctx, |_| {}).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown task 'compile-everything'"));
        assert!(message.contains(COMPILE_LIB_JS));
        assert!(transpiler.requests().is_empty());
        assert!(!project.path().join("tests/math.js").exists());
    }
}

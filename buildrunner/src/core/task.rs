//! Declarative task definitions.
//!
//! A task is a source glob plus a fixed list of stages. Definitions are plain
//! data so they can be built in code or read from `buildrunner.toml`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const COMPILE_LIB_JS: &str = "compile-lib-js";
pub const COMPILE_TESTS_JS: &str = "compile-tests-js";
pub const COMPILE_MATH_JS: &str = "compile-math-js";

const LIB_BASENAME: &str = "koheron-websocket-client";
const CLOSURE_COMPILER_JAR: &str = "node_modules/google-closure-compiler/compiler.jar";

/// A named, independently invocable pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    pub name: String,
    /// Glob pattern relative to the project root.
    pub src: String,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

/// One step of a task pipeline, applied to every artifact produced so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Join all artifacts into one file with the given name.
    Concat(String),
    /// Compile each artifact from CoffeeScript to JavaScript.
    Transpile(TranspileOptions),
    /// Write all artifacts into a directory relative to the project root.
    Dest(String),
    /// Minify and type-check all artifacts into one file.
    Optimize(ClosureOptions),
}

impl Stage {
    /// Short label used in logs and error context.
    pub fn label(&self) -> String {
        match self {
            Stage::Concat(file_name) => format!("concat {file_name}"),
            Stage::Transpile(_) => "transpile".to_string(),
            Stage::Dest(dir) => format!("dest {dir}"),
            Stage::Optimize(options) => format!("optimize {}", options.file_name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranspileOptions {
    /// Compile without the top-level function safety wrapper. Falls back to
    /// the configured transpiler default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bare: Option<bool>,
}

/// Closure Compiler invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureOptions {
    /// Path to `compiler.jar`, relative to the project root unless absolute.
    pub compiler_path: PathBuf,
    /// Name of the optimized output artifact.
    pub file_name: String,
    #[serde(default)]
    pub compiler_flags: CompilerFlags,
    /// Accept diagnostics on stderr when the compiler exits successfully.
    /// Off by default: any warning, including `checkTypes`, fails the stage.
    #[serde(default)]
    pub continue_with_warnings: bool,
}

/// Value of a single compiler flag: one string or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    One(String),
    Many(Vec<String>),
}

impl FlagValue {
    pub fn values(&self) -> &[String] {
        match self {
            FlagValue::One(value) => std::slice::from_ref(value),
            FlagValue::Many(values) => values,
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::One(value.to_string())
    }
}

impl From<&[&str]> for FlagValue {
    fn from(values: &[&str]) -> Self {
        FlagValue::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// Compiler flags keyed by flag name (`warning_level`, `jscomp_off`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerFlags(pub BTreeMap<String, FlagValue>);

impl CompilerFlags {
    pub fn with(mut self, name: &str, value: impl Into<FlagValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    #[cfg(test)]
    fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name)
    }

    /// Render as `--name=value` arguments, one per list element, flags
    /// ordered by name and values kept in list order.
    pub fn to_args(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(name, value)| {
                value
                    .values()
                    .iter()
                    .map(move |v| format!("--{name}={v}"))
            })
            .collect()
    }
}

/// The three tasks every project gets before configured tasks are applied.
pub fn builtin_tasks() -> Vec<TaskDef> {
    vec![compile_lib_js(), compile_tests_js(), compile_math_js()]
}

fn compile_lib_js() -> TaskDef {
    let js_name = format!("{LIB_BASENAME}.js");
    TaskDef {
        name: COMPILE_LIB_JS.to_string(),
        src: "src/*.coffee".to_string(),
        stages: vec![
            Stage::Concat(format!("{LIB_BASENAME}.coffee")),
            Stage::Transpile(TranspileOptions::default()),
            Stage::Dest("lib".to_string()),
            Stage::Concat(js_name.clone()),
            Stage::Optimize(ClosureOptions {
                compiler_path: PathBuf::from(CLOSURE_COMPILER_JAR),
                file_name: js_name,
                compiler_flags: CompilerFlags::default()
                    .with("warning_level", "VERBOSE")
                    .with("jscomp_warning", "checkTypes")
                    .with("jscomp_off", &["missingProperties", "checkVars"][..]),
                continue_with_warnings: false,
            }),
            Stage::Dest("lib".to_string()),
        ],
    }
}

fn compile_tests_js() -> TaskDef {
    transpile_single(COMPILE_TESTS_JS, "tests/tests.coffee", "tests")
}

fn compile_math_js() -> TaskDef {
    transpile_single(COMPILE_MATH_JS, "tests/math.coffee", "tests")
}

fn transpile_single(name: &str, src: &str, dest: &str) -> TaskDef {
    TaskDef {
        name: name.to_string(),
        src: src.to_string(),
        stages: vec![
            Stage::Transpile(TranspileOptions::default()),
            Stage::Dest(dest.to_string()),
        ],
    }
}

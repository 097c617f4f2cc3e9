//! Project configuration stored in `buildrunner.toml` at the project root.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::registry::TaskRegistry;
use crate::core::task::TaskDef;

pub const CONFIG_FILE_NAME: &str = "buildrunner.toml";

/// Buildrunner configuration (TOML).
///
/// Missing fields default to the behaviour of the stock build: silent empty
/// globs, `coffee` on `PATH`, `java` on `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Fail a task whose source glob matches no files instead of running it
    /// over an empty input.
    pub fail_on_empty: bool,

    /// Wall-clock limit for each external tool invocation, in seconds.
    pub tool_timeout_secs: u64,

    /// Discard tool stdout/stderr beyond this many bytes.
    pub tool_output_limit_bytes: usize,

    pub transpiler: TranspilerConfig,

    pub closure: ClosureConfig,

    /// Extra tasks, registered after the built-in ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TranspilerConfig {
    /// Command that reads CoffeeScript on stdin and prints JavaScript.
    pub command: Vec<String>,
    /// Default for transpile stages that do not set `bare`.
    pub bare: bool,
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "coffee".to_string(),
                "--compile".to_string(),
                "--stdio".to_string(),
            ],
            bare: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClosureConfig {
    /// Java launcher (plus JVM options) used to run `compiler.jar`.
    pub java: Vec<String>,
}

impl Default for ClosureConfig {
    fn default() -> Self {
        Self {
            java: vec!["java".to_string()],
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            fail_on_empty: false,
            tool_timeout_secs: 10 * 60,
            tool_output_limit_bytes: 1024 * 1024,
            transpiler: TranspilerConfig::default(),
            closure: ClosureConfig::default(),
            tasks: Vec::new(),
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tool_timeout_secs == 0 {
            return Err(anyhow!("tool_timeout_secs must be > 0"));
        }
        if self.tool_output_limit_bytes == 0 {
            return Err(anyhow!("tool_output_limit_bytes must be > 0"));
        }
        if self.transpiler.command.is_empty() || self.transpiler.command[0].trim().is_empty() {
            return Err(anyhow!("transpiler.command must be a non-empty array"));
        }
        if self.closure.java.is_empty() || self.closure.java[0].trim().is_empty() {
            return Err(anyhow!("closure.java must be a non-empty array"));
        }
        Ok(())
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    /// Built-in tasks overlaid with the configured ones, in file order.
    pub fn registry(&self) -> Result<TaskRegistry> {
        let mut registry = TaskRegistry::with_builtin_tasks();
        for task in &self.tasks {
            let name = task.name.clone();
            if registry
                .register(task.clone())
                .with_context(|| format!("register task '{name}'"))?
                .is_some()
            {
                tracing::debug!(task = %name, "configured task replaces earlier definition");
            }
        }
        Ok(registry)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BuildConfig::default()`.
pub fn load_config(path: &Path) -> Result<BuildConfig> {
    if !path.exists() {
        let cfg = BuildConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BuildConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::{COMPILE_TESTS_JS, Stage};

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, BuildConfig::default());
        assert!(!cfg.fail_on_empty);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "fail_on_empty = true\n[closure]\njava = [\"/opt/java/bin/java\", \"-Xmx1g\"]\n")
            .expect("write");
        let cfg = load_config(&path).expect("load");
        assert!(cfg.fail_on_empty);
        assert_eq!(cfg.closure.java, vec!["/opt/java/bin/java", "-Xmx1g"]);
        assert_eq!(cfg.transpiler, TranspilerConfig::default());
        assert_eq!(cfg.tool_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn rejects_zero_timeout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "tool_timeout_secs = 0\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("tool_timeout_secs"));
    }

    #[test]
    fn rejects_empty_transpiler_command() {
        let cfg = BuildConfig {
            transpiler: TranspilerConfig {
                command: Vec::new(),
                bare: false,
            },
            ..BuildConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn configured_task_overrides_builtin() {
        let raw = r#"
[[tasks]]
name = "compile-tests-js"
src = "spec/*.coffee"
stages = [{ transpile = { bare = true } }, { dest = "spec" }]

[[tasks]]
name = "copy-docs"
src = "docs/*.md"
stages = [{ dest = "lib/docs" }]
"#;
        let cfg: BuildConfig = toml::from_str(raw).expect("parse");
        let registry = cfg.registry().expect("registry");
        assert_eq!(registry.names().count(), 4);
        let tests_task = registry.get(COMPILE_TESTS_JS).expect("tests task");
        assert_eq!(tests_task.src, "spec/*.coffee");
        assert_eq!(tests_task.stages[1], Stage::Dest("spec".to_string()));
    }

    #[test]
    fn invalid_configured_task_is_an_error() {
        let raw = r#"
[[tasks]]
name = "broken"
src = ""
"#;
        let cfg: BuildConfig = toml::from_str(raw).expect("parse");
        let err = cfg.registry().unwrap_err();
        assert!(format!("{err:#}").contains("register task 'broken'"));
    }
}

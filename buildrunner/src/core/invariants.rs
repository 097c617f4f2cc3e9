//! Semantic checks on task definitions that serde cannot express.

use crate::core::task::{Stage, TaskDef};

/// Check a task definition:
/// - Non-empty name and source pattern
/// - Output file names are bare names (no directory separators)
/// - Dest directories are non-empty
pub fn validate_task(task: &TaskDef) -> Vec<String> {
    let mut errors = Vec::new();
    let name = if task.name.trim().is_empty() {
        errors.push("task name must be non-empty".to_string());
        "<unnamed>"
    } else {
        task.name.as_str()
    };

    if task.src.trim().is_empty() {
        errors.push(format!("{name}: src must be non-empty"));
    }

    for (index, stage) in task.stages.iter().enumerate() {
        match stage {
            Stage::Concat(file_name) => check_file_name(name, index, file_name, &mut errors),
            Stage::Optimize(options) => {
                check_file_name(name, index, &options.file_name, &mut errors);
                if options.compiler_path.as_os_str().is_empty() {
                    errors.push(format!("{name}: stage {index}: compiler_path must be non-empty"));
                }
            }
            Stage::Dest(dir) => {
                if dir.trim().is_empty() {
                    errors.push(format!("{name}: stage {index}: dest must be non-empty"));
                }
            }
            Stage::Transpile(_) => {}
        }
    }
    errors
}

fn check_file_name(task: &str, index: usize, file_name: &str, errors: &mut Vec<String>) {
    if file_name.trim().is_empty() {
        errors.push(format!("{task}: stage {index}: file name must be non-empty"));
    } else if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
        errors.push(format!(
            "{task}: stage {index}: file name '{file_name}' must not contain a path"
        ));
    }
}

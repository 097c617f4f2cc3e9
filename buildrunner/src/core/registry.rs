//! Explicit task table, built at startup and passed to commands.

use std::collections::BTreeMap;

use anyhow::{Result, bail};

use crate::core::invariants::validate_task;
use crate::core::task::{TaskDef, builtin_tasks};

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, TaskDef>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_tasks() -> Self {
        let mut registry = Self::new();
        for task in builtin_tasks() {
            registry.tasks.insert(task.name.clone(), task);
        }
        registry
    }

    /// Register `task`, replacing any task with the same name.
    ///
    /// Returns the replaced definition.
    pub fn register(&mut self, task: TaskDef) -> Result<Option<TaskDef>> {
        let errors = validate_task(&task);
        if !errors.is_empty() {
            bail!("invalid task definition:\n- {}", errors.join("\n- "));
        }
        Ok(self.tasks.insert(task.name.clone(), task))
    }

    pub fn get(&self, name: &str) -> Option<&TaskDef> {
        self.tasks.get(name)
    }

    /// Registered task names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }
}

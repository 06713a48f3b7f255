#![allow(dead_code)]

use std::path::{Path, PathBuf};

use nodeflow::fs::mock::MockFileSystem;
use nodeflow::task::TaskRef;

/// Builder for the text of one task file.
pub struct TaskFileBuilder {
    program: Option<String>,
    parameters: Option<String>,
    extra: Vec<String>,
}

impl TaskFileBuilder {
    pub fn new(program: &str, parameters: &str) -> Self {
        Self {
            program: Some(program.to_string()),
            parameters: Some(parameters.to_string()),
            extra: Vec::new(),
        }
    }

    pub fn without_program(mut self) -> Self {
        self.program = None;
        self
    }

    pub fn without_parameters(mut self) -> Self {
        self.parameters = None;
        self
    }

    pub fn extra_line(mut self, line: &str) -> Self {
        self.extra.push(line.to_string());
        self
    }

    pub fn build(self) -> String {
        let mut out = String::new();
        if let Some(p) = self.program {
            out.push_str(&format!("program: {p}\n"));
        }
        for line in self.extra {
            out.push_str(&line);
            out.push('\n');
        }
        if let Some(p) = self.parameters {
            out.push_str(&format!("parameters: {p}\n"));
        }
        out
    }
}

/// Builds a set of task files plus a task list on a `MockFileSystem`.
///
/// Task files are placed under `tasks/`; the task list is written to
/// `tasklist0.txt` in insertion order (the engine sorts it itself).
pub struct TaskSetBuilder {
    fs: MockFileSystem,
    entries: Vec<PathBuf>,
    tasklist: PathBuf,
}

impl TaskSetBuilder {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
            entries: Vec::new(),
            tasklist: PathBuf::from("tasklist0.txt"),
        }
    }

    /// Add `tasks/<name>` with the given file contents.
    pub fn with_task_file(mut self, name: &str, contents: impl Into<String>) -> Self {
        let path = Path::new("tasks").join(name);
        self.fs.add_file(&path, contents.into());
        self.entries.push(path);
        self
    }

    /// Add `tasks/1.<index>.txt` running `program` with parameters `task-<index>`.
    ///
    /// The engine derives order index `1<index>` from that name.
    pub fn with_indexed_task(self, index: u64, program: &str) -> Self {
        let contents = TaskFileBuilder::new(program, &format!("task-{index}")).build();
        self.with_task_file(&format!("1.{index}.txt"), contents)
    }

    /// List a path in the task list without creating the file.
    pub fn with_missing_task_file(mut self, name: &str) -> Self {
        self.entries.push(Path::new("tasks").join(name));
        self
    }

    pub fn build(self) -> (MockFileSystem, PathBuf) {
        let text: String = self
            .entries
            .iter()
            .map(|p| format!("{}\n", p.display()))
            .collect();
        self.fs.add_file(&self.tasklist, text);
        (self.fs, self.tasklist)
    }

    /// References in the order the task list file lists them.
    pub fn refs(&self) -> Vec<TaskRef> {
        self.entries.iter().cloned().map(TaskRef::new).collect()
    }
}

impl Default for TaskSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

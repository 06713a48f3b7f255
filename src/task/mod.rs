// src/task/mod.rs

//! Task inputs: the task-list file, task references with their order index,
//! and the two-record task descriptor format.
//!
//! A task file looks like:
//!
//! ```text
//! program: /path/to/runabm.sh
//! parameters: model.nlogo subexperiment.3.xml sweep 8
//! ```

pub mod descriptor;
pub mod reference;
pub mod tasklist;

pub use descriptor::TaskDescriptor;
pub use reference::{OrderIndex, TaskRef};
pub use tasklist::{load_task_list, parse_task_list};

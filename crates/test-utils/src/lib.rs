//! Shared test fixtures for `nodeflow`: a fake executor and builders for task
//! files and task lists on a `MockFileSystem`.

pub mod builders;
pub mod fake_executor;

pub use builders::{TaskFileBuilder, TaskSetBuilder};
pub use fake_executor::{ExecutionLog, FakeExecutor};

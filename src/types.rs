use clap::ValueEnum;
use serde::Deserialize;

/// What the pool does when a single task fails to decode or execute.
///
/// - `Continue`: mark that task failed and keep draining the queue (default).
///   The failure is still reflected in the final exit status.
/// - `Abort`: raise the pool-wide abort signal. Running processes are killed,
///   waiting workers give up, and whatever is left in the queue is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    Continue,
    Abort,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Continue
    }
}

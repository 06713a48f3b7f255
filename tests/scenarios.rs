// tests/scenarios.rs

mod common;
use crate::common::{executed, fast_options, init_tracing, new_log, run_pool};

use std::sync::Arc;
use std::time::{Duration, Instant};

use nodeflow::engine::{Coordinator, FailureKind, PoolOptions, TaskOutcome};
use nodeflow::errors::DecodeError;
use nodeflow::task::TaskRef;
use nodeflow::types::FailurePolicy;
use nodeflow_test_utils::{FakeExecutor, TaskFileBuilder, TaskSetBuilder};

fn failure_of(outcome: Option<&TaskOutcome>) -> nodeflow::engine::TaskFailure {
    match outcome {
        Some(TaskOutcome::Failed(f)) => f.clone(),
        other => panic!("expected a failure, got {other:?}"),
    }
}

/// Three well-formed tasks, `tasks/1.1.txt` to `tasks/1.3.txt` (indices 11 to 13);
/// the second optionally broken.
fn three_tasks(broken_second: Option<&str>) -> TaskSetBuilder {
    let second = match broken_second {
        Some("no-parameters") => TaskFileBuilder::new("sim", "task-2").without_parameters().build(),
        Some(program) => TaskFileBuilder::new(program, "task-2").build(),
        None => TaskFileBuilder::new("sim", "task-2").build(),
    };
    TaskSetBuilder::new()
        .with_indexed_task(3, "sim")
        .with_task_file("1.2.txt", second)
        .with_indexed_task(1, "sim")
}

#[tokio::test]
async fn scenario_a_three_tasks_start_in_index_order() {
    init_tracing();

    let (fs, list) = three_tasks(None).build();
    let log = new_log();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(log.clone()),
        fast_options(3, FailurePolicy::Continue),
    )
    .await;

    assert_eq!(summary.admission_order(), vec![11, 12, 13]);
    assert_eq!(
        executed(&log),
        vec!["tasks/1.1.txt", "tasks/1.2.txt", "tasks/1.3.txt"]
    );
    assert_eq!(summary.succeeded(), 3);
    assert_eq!(summary.retired_workers, 3);
    assert!(summary.is_success());
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn scenario_b_missing_parameters_fails_only_that_task_under_continue() {
    init_tracing();

    let (fs, list) = three_tasks(Some("no-parameters")).build();
    let log = new_log();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(log.clone()),
        fast_options(3, FailurePolicy::Continue),
    )
    .await;

    assert_eq!(executed(&log), vec!["tasks/1.1.txt", "tasks/1.3.txt"]);

    let failure = failure_of(summary.outcome_of(&TaskRef::new("tasks/1.2.txt")));
    assert_eq!(failure.kind, FailureKind::Decode);
    assert_eq!(failure.decode, Some(DecodeError::MissingField("parameters")));
    assert!(failure.message.contains("tasks/1.2.txt"));

    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert!(!summary.aborted);
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn scenario_b_missing_parameters_stops_the_pool_under_abort() {
    init_tracing();

    let (fs, list) = three_tasks(Some("no-parameters")).build();
    let log = new_log();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(log.clone()),
        fast_options(3, FailurePolicy::Abort),
    )
    .await;

    // Task 3 cannot be admitted while the failing worker still holds index 2,
    // and that worker raises the abort before it moves on.
    assert_eq!(executed(&log), vec!["tasks/1.1.txt"]);
    assert!(summary.aborted);
    assert_eq!(summary.failed(), 1);
    assert!(!matches!(
        summary.outcome_of(&TaskRef::new("tasks/1.3.txt")),
        Some(TaskOutcome::Success)
    ));
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn abort_with_single_worker_leaves_rest_of_queue_unprocessed() {
    init_tracing();

    let (fs, list) = three_tasks(Some("no-parameters")).build();
    let log = new_log();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(log.clone()),
        fast_options(1, FailurePolicy::Abort),
    )
    .await;

    assert_eq!(executed(&log), vec!["tasks/1.1.txt"]);
    assert_eq!(summary.unprocessed, vec![TaskRef::new("tasks/1.3.txt")]);
    assert_eq!(summary.records.len(), 2);
    assert!(summary.aborted);
}

#[tokio::test]
async fn scenario_c_non_zero_exit_is_an_execution_failure() {
    init_tracing();

    let (fs, list) = three_tasks(Some("crashing-sim")).build();
    let log = new_log();
    let executor = FakeExecutor::new(log.clone()).with_exit_code("crashing-sim", 3);
    let summary = run_pool(fs, &list, executor, fast_options(3, FailurePolicy::Continue)).await;

    assert_eq!(
        executed(&log),
        vec!["tasks/1.1.txt", "tasks/1.2.txt", "tasks/1.3.txt"]
    );
    let failure = failure_of(summary.outcome_of(&TaskRef::new("tasks/1.2.txt")));
    assert_eq!(failure.kind, FailureKind::Execution);
    assert!(failure.message.contains("exit code 3"));
    assert!(failure.message.contains("tasks/1.2.txt"));
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn scenario_c_non_zero_exit_under_abort_skips_later_tasks() {
    init_tracing();

    let (fs, list) = three_tasks(Some("crashing-sim")).build();
    let log = new_log();
    let executor = FakeExecutor::new(log.clone()).with_exit_code("crashing-sim", 1);
    let summary = run_pool(fs, &list, executor, fast_options(2, FailurePolicy::Abort)).await;

    assert_eq!(executed(&log), vec!["tasks/1.1.txt", "tasks/1.2.txt"]);
    assert!(summary.aborted);
    assert_eq!(summary.failed(), 1);
    assert!(!summary.is_success());
}

#[tokio::test]
async fn scenario_d_name_without_digits_is_an_order_index_error() {
    init_tracing();

    let (fs, list) = TaskSetBuilder::new()
        .with_indexed_task(2, "sim")
        .with_task_file("setup.txt", TaskFileBuilder::new("sim", "prepare").build())
        .with_indexed_task(1, "sim")
        .build();
    let log = new_log();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(log.clone()),
        fast_options(2, FailurePolicy::Continue),
    )
    .await;

    let failure = failure_of(summary.outcome_of(&TaskRef::new("tasks/setup.txt")));
    assert!(failure.is_order_index_error());
    assert_eq!(failure.kind, FailureKind::Decode);
    assert!(failure.message.contains("tasks/setup.txt"));

    // Never admitted and never run as index 0.
    assert_eq!(summary.admission_order(), vec![11, 12]);
    assert_eq!(executed(&log), vec!["tasks/1.1.txt", "tasks/1.2.txt"]);
    assert_eq!(summary.exit_code(), 1);
}

#[tokio::test]
async fn empty_task_list_finishes_without_waiting_for_a_poll() {
    init_tracing();

    let (fs, list) = TaskSetBuilder::new().build();
    let options = PoolOptions {
        workers: 4,
        failure_policy: FailurePolicy::Continue,
        poll_interval: Duration::from_secs(60),
    };

    let started = Instant::now();
    let summary = run_pool(fs, &list, FakeExecutor::new(new_log()), options).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(summary.total, 0);
    assert_eq!(summary.retired_workers, 4);
    assert!(summary.is_success());
}

#[tokio::test]
async fn single_worker_and_pool_admit_in_the_same_order() {
    init_tracing();

    let builder = || {
        [5, 2, 9, 1, 7, 3, 8, 4, 6]
            .into_iter()
            .fold(TaskSetBuilder::new(), |b, i| b.with_indexed_task(i, "sim"))
    };

    let (fs, list) = builder().build();
    let serial = run_pool(
        fs,
        &list,
        FakeExecutor::new(new_log()),
        fast_options(1, FailurePolicy::Continue),
    )
    .await;

    let (fs, list) = builder().build();
    let pooled = run_pool(
        fs,
        &list,
        FakeExecutor::new(new_log()),
        fast_options(4, FailurePolicy::Continue),
    )
    .await;

    let expected: Vec<u64> = (11..=19).collect();
    assert_eq!(serial.admission_order(), expected);
    assert_eq!(pooled.admission_order(), expected);
}

#[tokio::test]
async fn rerun_on_same_list_gives_same_admission_sequence() {
    init_tracing();

    let build = || {
        TaskSetBuilder::new()
            .with_indexed_task(4, "sim")
            .with_indexed_task(1, "sim")
            .with_indexed_task(3, "sim")
            .with_indexed_task(2, "sim")
            .build()
    };

    let mut sequences = Vec::new();
    for _ in 0..3 {
        let (fs, list) = build();
        let summary = run_pool(
            fs,
            &list,
            FakeExecutor::new(new_log()),
            fast_options(3, FailurePolicy::Continue),
        )
        .await;
        let paths: Vec<String> = summary.admissions.iter().map(|a| a.task.to_string()).collect();
        sequences.push(paths);
    }

    assert_eq!(sequences[0], sequences[1]);
    assert_eq!(sequences[1], sequences[2]);
}

#[tokio::test]
async fn execution_is_effectively_serial_regardless_of_pool_size() {
    init_tracing();

    let (fs, list) = (1..=5)
        .fold(TaskSetBuilder::new(), |b, i| b.with_indexed_task(i, "sim"))
        .build();
    let executor = FakeExecutor::new(new_log()).with_delay(Duration::from_millis(20));
    let max_running = executor.max_running();

    let summary = run_pool(fs, &list, executor, fast_options(4, FailurePolicy::Continue)).await;

    assert!(summary.is_success());
    assert_eq!(*max_running.lock().unwrap(), 1);
}

#[tokio::test]
async fn pool_corrects_lexicographic_order_but_single_worker_follows_queue() {
    init_tracing();

    // "1.10.txt" (index 110) sorts before "1.9.txt" (index 19).
    let build = || {
        TaskSetBuilder::new()
            .with_indexed_task(9, "sim")
            .with_indexed_task(10, "sim")
            .build()
    };

    let (fs, list) = build();
    let pooled = run_pool(
        fs,
        &list,
        FakeExecutor::new(new_log()),
        fast_options(2, FailurePolicy::Continue),
    )
    .await;
    assert_eq!(pooled.admission_order(), vec![19, 110]);

    let (fs, list) = build();
    let serial = run_pool(
        fs,
        &list,
        FakeExecutor::new(new_log()),
        fast_options(1, FailurePolicy::Continue),
    )
    .await;
    assert_eq!(serial.admission_order(), vec![110, 19]);
}

#[tokio::test]
async fn digits_from_every_run_in_the_name_form_the_index() {
    init_tracing();

    // Listed so the queue hands out "a2b1" first; index 12 must still start
    // before index 21.
    let (fs, list) = TaskSetBuilder::new()
        .with_task_file("b-a2b1.txt", TaskFileBuilder::new("sim", "second").build())
        .with_task_file("c-a1b2.txt", TaskFileBuilder::new("sim", "first").build())
        .build();
    let log = new_log();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(log.clone()),
        fast_options(2, FailurePolicy::Continue),
    )
    .await;

    assert_eq!(summary.admission_order(), vec![12, 21]);
    assert_eq!(executed(&log), vec!["tasks/c-a1b2.txt", "tasks/b-a2b1.txt"]);
    assert!(summary.is_success());
}

#[tokio::test]
async fn task_file_without_program_fails_only_that_task() {
    init_tracing();

    let broken = TaskFileBuilder::new("sim", "task-2")
        .without_program()
        .extra_line("# generated by the experiment splitter")
        .build();
    let builder = TaskSetBuilder::new()
        .with_indexed_task(3, "sim")
        .with_task_file("1.2.txt", broken)
        .with_indexed_task(1, "sim");
    let listed = builder.refs();
    let (fs, list) = builder.build();

    let log = new_log();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(log.clone()),
        fast_options(3, FailurePolicy::Continue),
    )
    .await;

    for task in &listed {
        assert!(summary.outcome_of(task).is_some(), "{task} has no outcome");
    }
    let failure = failure_of(summary.outcome_of(&TaskRef::new("tasks/1.2.txt")));
    assert_eq!(failure.decode, Some(DecodeError::MissingField("program")));
    assert_eq!(executed(&log), vec!["tasks/1.1.txt", "tasks/1.3.txt"]);
    assert_eq!(summary.failed(), 1);
}

#[tokio::test]
async fn missing_task_file_is_a_decode_failure() {
    init_tracing();

    let (fs, list) = TaskSetBuilder::new()
        .with_indexed_task(1, "sim")
        .with_missing_task_file("1.2.txt")
        .build();
    let summary = run_pool(
        fs,
        &list,
        FakeExecutor::new(new_log()),
        fast_options(2, FailurePolicy::Continue),
    )
    .await;

    let failure = failure_of(summary.outcome_of(&TaskRef::new("tasks/1.2.txt")));
    assert!(matches!(failure.decode, Some(DecodeError::Unreadable(_))));
    assert_eq!(summary.succeeded(), 1);
}

#[tokio::test]
async fn program_that_cannot_start_is_an_execution_failure() {
    init_tracing();

    let (fs, list) = three_tasks(Some("ghost")).build();
    let executor = FakeExecutor::new(new_log()).with_unstartable("ghost");
    let summary = run_pool(fs, &list, executor, fast_options(2, FailurePolicy::Continue)).await;

    let failure = failure_of(summary.outcome_of(&TaskRef::new("tasks/1.2.txt")));
    assert_eq!(failure.kind, FailureKind::Execution);
    assert!(failure.message.contains("could not start"));
    assert_eq!(summary.succeeded(), 2);
}

#[tokio::test]
async fn external_abort_cancels_running_task_and_skips_the_rest() {
    init_tracing();

    let (fs, list) = (1..=4)
        .fold(TaskSetBuilder::new(), |b, i| b.with_indexed_task(i, "sim"))
        .build();
    let log = new_log();
    let executor = FakeExecutor::new(log.clone()).with_delay(Duration::from_secs(30));

    let coordinator = Coordinator::new(
        fast_options(2, FailurePolicy::Continue),
        Arc::new(fs),
        Arc::new(executor),
    );
    let abort = coordinator.abort_signal();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        abort.trigger();
    });

    let summary = tokio::time::timeout(Duration::from_secs(10), coordinator.run_task_list(&list))
        .await
        .expect("abort should end the run")
        .unwrap();

    assert_eq!(executed(&log), vec!["tasks/1.1.txt"]);
    assert!(summary.aborted);
    assert_eq!(summary.cancelled(), 2);
    assert_eq!(summary.unprocessed.len(), 2);
    assert_eq!(summary.exit_code(), 1);
}

// tests/property_scheduler.rs

mod common;
use crate::common::builders::JobBuilder;
use crate::common::fake_jobs::{CountingJob, StepLog, new_step_log};

use proptest::prelude::*;

use jobrun::job::Job;
use jobrun::sched::{RunMode, RunOutcome, Scheduler};

/// Random dependency forest encoded as `(parent_seed, yields)` per node.
/// Node 0 is the root; node `i > 0` hangs off `parent_seed % i`, which is
/// always an earlier node, so the result is a tree by construction.
fn tree_spec() -> impl Strategy<Value = Vec<(usize, u32)>> {
    prop::collection::vec((any::<usize>(), 0u32..4), 1..10)
}

fn parent_of(spec: &[(usize, u32)]) -> Vec<usize> {
    spec.iter()
        .enumerate()
        .map(|(i, (seed, _))| if i == 0 { 0 } else { seed % i })
        .collect()
}

fn build_node(i: usize, children: &[Vec<usize>], spec: &[(usize, u32)], log: &StepLog) -> Job {
    let name = format!("n{i}");
    let mut builder = JobBuilder::new(CountingJob::new(&name, spec[i].1, log.clone())).id(&name);
    for &child in &children[i] {
        builder = builder.depends_on(build_node(child, children, spec, log));
    }
    builder.build()
}

proptest! {
    #[test]
    fn random_trees_drain_with_exact_step_counts(spec in tree_spec()) {
        let parents = parent_of(&spec);
        let mut children = vec![Vec::new(); spec.len()];
        for i in 1..spec.len() {
            children[parents[i]].push(i);
        }

        let log = new_step_log();
        let mut scheduler = Scheduler::new(64);
        scheduler.schedule(build_node(0, &children, &spec, &log)).unwrap();
        prop_assert_eq!(scheduler.tracked_len(), spec.len());

        let outcome = scheduler.run(RunMode::Atomic).unwrap();
        prop_assert_eq!(outcome, RunOutcome::Drained);
        prop_assert!(scheduler.is_drained());

        let steps = log.lock().unwrap().clone();
        let expected: u32 = spec.iter().map(|(_, yields)| yields + 1).sum();
        prop_assert_eq!(steps.len(), expected as usize);

        // Every node is stepped exactly yields + 1 times.
        for (i, (_, yields)) in spec.iter().enumerate() {
            let name = format!("n{i}");
            let count = steps.iter().filter(|step| **step == name).count();
            prop_assert_eq!(count, (*yields + 1) as usize, "node {} step count", i);
        }
    }

    #[test]
    fn parents_never_step_before_their_children_finish(spec in tree_spec()) {
        let parents = parent_of(&spec);
        let mut children = vec![Vec::new(); spec.len()];
        for i in 1..spec.len() {
            children[parents[i]].push(i);
        }

        let log = new_step_log();
        let mut scheduler = Scheduler::new(64);
        scheduler.schedule(build_node(0, &children, &spec, &log)).unwrap();
        scheduler.run(RunMode::Atomic).unwrap();

        let steps = log.lock().unwrap().clone();
        for i in 1..spec.len() {
            let child = format!("n{i}");
            let parent = format!("n{}", parents[i]);
            let child_last = steps.iter().rposition(|step| *step == child);
            let parent_first = steps.iter().position(|step| *step == parent);
            match (child_last, parent_first) {
                (Some(last), Some(first)) => prop_assert!(
                    last < first,
                    "child {} last stepped at {} but parent {} first stepped at {}",
                    child, last, parent, first
                ),
                _ => prop_assert!(false, "missing steps for {} or {}", child, parent),
            }
        }
    }
}

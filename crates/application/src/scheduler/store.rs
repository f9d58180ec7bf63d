//! Per-run result arena shared by scheduler workers.

use apiprobe_domain::{TestCase, TestResult, Variables};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

/// Why a test cannot run yet (or at all) in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The dependency has produced no result.
    Unmet(String),
    /// The dependency ran and failed.
    Failed(String),
    /// The test sits on or behind a dependency cycle.
    Cycle,
}

/// Outcome of trying to claim a test for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The caller now owns the test; holds the dependencies' extracted
    /// variables, later dependencies overriding earlier ones.
    Ready(Variables),
    /// A dependency has not passed.
    Blocked(BlockReason),
    /// Another worker already claimed this test.
    Taken,
}

#[derive(Debug, Default)]
struct StoreState {
    claimed: IndexSet<String>,
    results: IndexMap<String, TestResult>,
}

/// Test name to result, written once per name.
///
/// The readiness check and the claim happen under one write lock, so two
/// workers can never both decide to run the same test.
#[derive(Debug, Default)]
pub struct ResultStore {
    state: RwLock<StoreState>,
}

impl ResultStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that every dependency passed and, if so, claims the test.
    pub fn claim(&self, test: &TestCase) -> Claim {
        let mut state = self.state.write();
        if state.claimed.contains(&test.name) {
            return Claim::Taken;
        }

        let mut variables = Variables::new();
        for dependency in &test.depends_on {
            match state.results.get(dependency) {
                Some(result) if result.success => {
                    variables.extend(
                        result
                            .variables
                            .iter()
                            .map(|(k, v)| (k.clone(), v.clone())),
                    );
                }
                Some(_) => return Claim::Blocked(BlockReason::Failed(dependency.clone())),
                None => return Claim::Blocked(BlockReason::Unmet(dependency.clone())),
            }
        }

        state.claimed.insert(test.name.clone());
        Claim::Ready(variables)
    }

    /// Stores the result of a claimed test.
    pub fn publish(&self, result: TestResult) {
        let mut state = self.state.write();
        state.results.insert(result.name.clone(), result);
    }

    /// Returns `Some(success)` once the named test has a result.
    #[must_use]
    pub fn status(&self, name: &str) -> Option<bool> {
        self.state.read().results.get(name).map(|r| r.success)
    }

    /// Removes and returns all results in publication order.
    #[must_use]
    pub fn drain_results(&self) -> Vec<TestResult> {
        let mut state = self.state.write();
        std::mem::take(&mut state.results).into_values().collect()
    }
}

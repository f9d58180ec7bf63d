//! Dependency graph validation.

use std::collections::{HashMap, HashSet, VecDeque};

use apiprobe_domain::TestCase;

use super::SchedulerError;

/// Validated view of a suite's dependency declarations.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    names: HashSet<&'a str>,
    cyclic: HashSet<&'a str>,
}

impl<'a> DependencyGraph<'a> {
    /// Checks test names are unique and finds tests caught in a cycle.
    ///
    /// Dependencies on names missing from the suite are allowed here; such
    /// tests are blocked at run time. Tests on a cycle, or depending on one,
    /// can never become ready and are reported by [`DependencyGraph::cyclic`].
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateTest`] if two tests share a name.
    pub fn build(tests: &'a [TestCase]) -> Result<Self, SchedulerError> {
        let mut names = HashSet::with_capacity(tests.len());
        for test in tests {
            if !names.insert(test.name.as_str()) {
                return Err(SchedulerError::DuplicateTest(test.name.clone()));
            }
        }

        // Kahn's algorithm over edges that point at tests in this suite.
        let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(tests.len());
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for test in tests {
            let known: HashSet<&str> = test
                .depends_on
                .iter()
                .map(String::as_str)
                .filter(|dep| names.contains(dep))
                .collect();
            in_degree.insert(test.name.as_str(), known.len());
            for dep in known {
                dependents.entry(dep).or_default().push(test.name.as_str());
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();
        while let Some(name) = queue.pop_front() {
            for dependent in dependents.get(name).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        let cyclic = in_degree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(name, _)| name)
            .collect();

        Ok(Self { names, cyclic })
    }

    /// Returns true if the suite declares a test with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns true if the test sits on, or behind, a dependency cycle.
    #[must_use]
    pub fn in_cycle(&self, name: &str) -> bool {
        self.cyclic.contains(name)
    }

    /// Names of every test held back by a dependency cycle, sorted.
    #[must_use]
    pub fn cyclic(&self) -> Vec<&'a str> {
        let mut names: Vec<&str> = self.cyclic.iter().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_valid_chain() {
        let tests = vec![
            TestCase::new("c", "/").depends_on("b"),
            TestCase::new("b", "/").depends_on("a"),
            TestCase::new("a", "/"),
        ];
        let graph = DependencyGraph::build(&tests).unwrap();
        assert!(graph.contains("a"));
        assert!(!graph.contains("zz"));
        assert!(!graph.in_cycle("c"));
    }

    #[test]
    fn test_missing_dependency_is_not_an_error() {
        let tests = vec![TestCase::new("a", "/").depends_on("ghost")];
        assert!(DependencyGraph::build(&tests).is_ok());
    }

    #[test]
    fn test_duplicate_names() {
        let tests = vec![TestCase::new("a", "/"), TestCase::new("a", "/x")];
        assert_eq!(
            DependencyGraph::build(&tests).unwrap_err(),
            SchedulerError::DuplicateTest("a".to_string())
        );
    }

    #[test]
    fn test_cycle_detection() {
        let tests = vec![
            TestCase::new("root", "/"),
            TestCase::new("a", "/").depends_on("b"),
            TestCase::new("b", "/").depends_on("a"),
            TestCase::new("behind", "/").depends_on("a"),
            TestCase::new("self", "/").depends_on("self"),
            TestCase::new("leaf", "/").depends_on("root"),
        ];
        let graph = DependencyGraph::build(&tests).unwrap();
        assert_eq!(graph.cyclic(), vec!["a", "b", "behind", "self"]);
        assert!(graph.in_cycle("self"));
        assert!(!graph.in_cycle("root"));
        assert!(!graph.in_cycle("leaf"));
    }

    #[test]
    fn test_acyclic_graph_has_no_cyclic_tests() {
        let tests = vec![
            TestCase::new("b", "/").depends_on("a"),
            TestCase::new("a", "/"),
        ];
        assert!(DependencyGraph::build(&tests).unwrap().cyclic().is_empty());
    }
}

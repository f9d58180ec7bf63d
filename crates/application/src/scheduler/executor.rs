//! Suite execution: per-test pipeline plus sequential and wave scheduling.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use apiprobe_domain::{RunSummary, TestCase, TestResult, TestSuite, Variables};
use parking_lot::Mutex;
use tracing::{Instrument, debug, info, info_span, warn};

use super::graph::DependencyGraph;
use super::store::{BlockReason, Claim, ResultStore};
use super::SchedulerError;
use crate::assertions::AssertionEngine;
use crate::extraction::VariableExtractor;
use crate::ports::{FileSystem, HttpClient};
use crate::request_executor::RequestExecutor;

/// Runs one test: request, then extraction, then assertions.
pub struct TestRunner<C: HttpClient, F: FileSystem> {
    requests: RequestExecutor<C, F>,
    extractor: VariableExtractor,
    assertions: AssertionEngine,
}

impl<C: HttpClient, F: FileSystem> TestRunner<C, F> {
    /// Creates a runner over the given ports.
    pub const fn new(client: Arc<C>, fs: Arc<F>) -> Self {
        Self {
            requests: RequestExecutor::new(client, fs),
            extractor: VariableExtractor::new(),
            assertions: AssertionEngine::new(),
        }
    }

    /// Executes `test` with the variables visible to it.
    ///
    /// A transport failure skips extraction and assertions. An extraction
    /// failure skips assertions. Assertion failures are all collected into
    /// one error message.
    pub async fn run(&self, test: &TestCase, base_url: &str, variables: &Variables) -> TestResult {
        let mut result = self.requests.execute(test, base_url, variables).await;
        if !result.success {
            return result;
        }

        if let Err(error) = self.extractor.extract(&mut result, &test.extract) {
            result.fail(format!("variable extraction failed: {error}"));
            return result;
        }

        let failures = self.assertions.run(&result, &test.assertions, variables);
        if !failures.is_empty() {
            result.fail(format!("assertions failed: {}", failures.join("; ")));
        }
        result
    }
}

/// Shared, owned inputs for one suite run.
struct RunContext<C: HttpClient, F: FileSystem> {
    runner: Arc<TestRunner<C, F>>,
    store: Arc<ResultStore>,
    base_url: Arc<str>,
    globals: Arc<Variables>,
}

impl<C: HttpClient, F: FileSystem> Clone for RunContext<C, F> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            store: Arc::clone(&self.store),
            base_url: Arc::clone(&self.base_url),
            globals: Arc::clone(&self.globals),
        }
    }
}

impl<C: HttpClient, F: FileSystem> RunContext<C, F> {
    /// Claims, runs and publishes one test. Returns false if it was not run.
    async fn run_claimed(&self, test: &TestCase) -> Result<bool, BlockReason> {
        let dependency_vars = match self.store.claim(test) {
            Claim::Ready(vars) => vars,
            Claim::Blocked(reason) => return Err(reason),
            Claim::Taken => return Ok(false),
        };

        let mut variables = (*self.globals).clone();
        variables.extend(dependency_vars);

        let span = info_span!("test", name = %test.name);
        let result = self
            .runner
            .run(test, &self.base_url, &variables)
            .instrument(span)
            .await;
        if !result.success {
            debug!(test = %test.name, error = result.error_message(), "test failed");
        }
        self.store.publish(result);
        Ok(true)
    }
}

/// Use case for running a test suite.
///
/// Each call to [`SuiteExecutor::execute`] gets its own result store, so one
/// executor can run several suites, even at the same time.
pub struct SuiteExecutor<C: HttpClient, F: FileSystem> {
    runner: Arc<TestRunner<C, F>>,
}

impl<C, F> SuiteExecutor<C, F>
where
    C: HttpClient + 'static,
    F: FileSystem + 'static,
{
    /// Creates a new executor over the given ports.
    pub fn new(client: Arc<C>, fs: Arc<F>) -> Self {
        Self {
            runner: Arc::new(TestRunner::new(client, fs)),
        }
    }

    /// Runs every runnable test of the suite.
    ///
    /// Sequential runs return results in declaration order; concurrent runs
    /// return them sorted by test name. Tests whose dependencies did not pass
    /// produce no result, and neither do tests caught in a dependency cycle.
    ///
    /// # Errors
    ///
    /// Fails before any request when test names repeat, and during a
    /// concurrent run if a worker task dies.
    pub async fn execute(&self, suite: &TestSuite) -> Result<Vec<TestResult>, SchedulerError> {
        let graph = DependencyGraph::build(&suite.tests)?;
        let context = RunContext {
            runner: Arc::clone(&self.runner),
            store: Arc::new(ResultStore::new()),
            base_url: Arc::from(suite.base_url.as_str()),
            globals: Arc::new(suite.variables.clone()),
        };

        info!(
            suite = %suite.name,
            tests = suite.tests.len(),
            concurrent = suite.concurrent,
            "starting suite run"
        );
        let cyclic = graph.cyclic();
        if !cyclic.is_empty() {
            warn!(suite = %suite.name, tests = %cyclic.join(", "), "dependency cycle detected");
        }

        let results = if suite.concurrent {
            let mut results =
                Self::execute_waves(&context, &graph, &suite.tests, suite.effective_max_workers())
                    .await?;
            results.sort_by(|a, b| a.name.cmp(&b.name));
            results
        } else {
            Self::execute_sequential(&context, &graph, &suite.tests).await
        };

        let summary = RunSummary::from_results(&results);
        info!(
            suite = %suite.name,
            executed = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "suite run finished"
        );
        Ok(results)
    }

    /// Runs one test outside any suite, without dependency checks.
    pub async fn run_single(
        &self,
        test: &TestCase,
        base_url: &str,
        variables: &Variables,
    ) -> TestResult {
        let span = info_span!("test", name = %test.name);
        self.runner
            .run(test, base_url, variables)
            .instrument(span)
            .await
    }

    async fn execute_sequential(
        context: &RunContext<C, F>,
        graph: &DependencyGraph<'_>,
        tests: &[TestCase],
    ) -> Vec<TestResult> {
        for test in tests {
            let outcome = if graph.in_cycle(&test.name) {
                Err(BlockReason::Cycle)
            } else {
                context.run_claimed(test).await
            };
            if let Err(reason) = outcome {
                log_blocked(test, &reason, graph);
            }
        }
        context.store.drain_results()
    }

    async fn execute_waves(
        context: &RunContext<C, F>,
        graph: &DependencyGraph<'_>,
        tests: &[TestCase],
        max_workers: usize,
    ) -> Result<Vec<TestResult>, SchedulerError> {
        let mut pending: Vec<&TestCase> = tests.iter().collect();
        let mut blocked: HashSet<String> = HashSet::new();
        let mut wave = 0usize;

        loop {
            // Blocks propagate down dependency chains until nothing changes.
            loop {
                let before = pending.len();
                pending.retain(|test| match blocking_reason(test, graph, &context.store, &blocked) {
                    Some(reason) => {
                        log_blocked(test, &reason, graph);
                        blocked.insert(test.name.clone());
                        false
                    }
                    None => true,
                });
                if pending.len() == before {
                    break;
                }
            }

            let (ready, waiting): (Vec<&TestCase>, Vec<&TestCase>) =
                pending.into_iter().partition(|test| {
                    test.depends_on
                        .iter()
                        .all(|dep| context.store.status(dep) == Some(true))
                });
            pending = waiting;

            if ready.is_empty() {
                for test in &pending {
                    warn!(test = %test.name, "test never became ready");
                }
                break;
            }

            wave += 1;
            debug!(wave, tests = ready.len(), "running wave");
            Self::run_wave(context, ready, max_workers).await?;
        }

        Ok(context.store.drain_results())
    }

    /// Runs one wave on a bounded pool of workers pulling from a shared queue.
    async fn run_wave(
        context: &RunContext<C, F>,
        wave: Vec<&TestCase>,
        max_workers: usize,
    ) -> Result<(), SchedulerError> {
        let workers = max_workers.max(1).min(wave.len());
        let queue: Arc<Mutex<VecDeque<TestCase>>> =
            Arc::new(Mutex::new(wave.into_iter().cloned().collect()));

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let context = context.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let Some(test) = queue.lock().pop_front() else {
                        break;
                    };
                    if let Err(reason) = context.run_claimed(&test).await {
                        warn!(test = %test.name, ?reason, "test not ready when dequeued");
                    }
                }
            }));
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| SchedulerError::Worker(e.to_string()))?;
        }
        Ok(())
    }
}

fn blocking_reason(
    test: &TestCase,
    graph: &DependencyGraph<'_>,
    store: &ResultStore,
    blocked: &HashSet<String>,
) -> Option<BlockReason> {
    if graph.in_cycle(&test.name) {
        return Some(BlockReason::Cycle);
    }
    test.depends_on.iter().find_map(|dep| {
        if !graph.contains(dep) || blocked.contains(dep) {
            Some(BlockReason::Unmet(dep.clone()))
        } else if store.status(dep) == Some(false) {
            Some(BlockReason::Failed(dep.clone()))
        } else {
            None
        }
    })
}

fn log_blocked(test: &TestCase, reason: &BlockReason, graph: &DependencyGraph<'_>) {
    match reason {
        BlockReason::Failed(dep) => {
            warn!(test = %test.name, dependency = %dep, "skipping test: dependency failed");
        }
        BlockReason::Unmet(dep) if !graph.contains(dep) => {
            warn!(test = %test.name, dependency = %dep, "skipping test: dependency not in suite");
        }
        BlockReason::Unmet(dep) => {
            warn!(test = %test.name, dependency = %dep, "skipping test: dependency did not run");
        }
        BlockReason::Cycle => {
            warn!(test = %test.name, "skipping test: dependency cycle");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use apiprobe_domain::{Assertion, RequestSpec, ResponseHeaders, ResponseSpec};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ports::{FileSystemError, HttpClientError};

    /// Routes by URL path; tracks request count and peak concurrency.
    #[derive(Default)]
    struct ScriptedClient {
        routes: HashMap<String, (u16, String)>,
        latency: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn route(mut self, path: &str, status: u16, body: &str) -> Self {
            self.routes
                .insert(path.to_string(), (status, body.to_string()));
            self
        }

        const fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }
    }

    impl HttpClient for ScriptedClient {
        fn execute(
            &self,
            request: &RequestSpec,
        ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send {
            let path = request
                .url
                .trim_start_matches("http://api.test")
                .to_string();
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                self.seen.lock().push(path.clone());
                if !self.latency.is_zero() {
                    tokio::time::sleep(self.latency).await;
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);

                let (status, body) = self
                    .routes
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, String::new()));
                Ok(ResponseSpec::new(
                    status,
                    ResponseHeaders::new(),
                    body.as_bytes(),
                    Duration::from_millis(1),
                ))
            }
        }
    }

    struct NoFiles;

    impl FileSystem for NoFiles {
        fn read_file_string(
            &self,
            path: &Path,
        ) -> impl Future<Output = Result<String, FileSystemError>> + Send {
            let path = path.to_path_buf();
            async move { Err(FileSystemError::NotFound(path)) }
        }
    }

    fn executor(
        client: ScriptedClient,
    ) -> (SuiteExecutor<ScriptedClient, NoFiles>, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        (
            SuiteExecutor::new(Arc::clone(&client), Arc::new(NoFiles)),
            client,
        )
    }

    fn names(results: &[TestResult]) -> Vec<&str> {
        results.iter().map(|r| r.name.as_str()).collect()
    }

    fn chain_suite() -> TestSuite {
        TestSuite::new("chain", "http://api.test")
            .with_variable("org", "acme")
            .with_test(
                TestCase::new("create", "/${org}/posts")
                    .with_assertion(Assertion::status_code(201))
                    .with_extraction("post_id", "json:id"),
            )
            .with_test(
                TestCase::new("fetch", "/posts/${post_id}")
                    .depends_on("create")
                    .with_extraction("author", "json:author"),
            )
            .with_test(
                TestCase::new("author", "/users/${author}")
                    .depends_on("fetch")
                    .with_assertion(Assertion::json_path("name", "Ada")),
            )
    }

    fn chain_client() -> ScriptedClient {
        ScriptedClient::default()
            .route("/acme/posts", 201, r#"{"id":"42"}"#)
            .route("/posts/42", 200, r#"{"author":"u1"}"#)
            .route("/users/u1", 200, r#"{"name":"Ada"}"#)
    }

    #[tokio::test]
    async fn test_sequential_propagates_variables() {
        let (executor, client) = executor(chain_client());
        let results = executor.execute(&chain_suite()).await.unwrap();

        assert_eq!(names(&results), vec!["create", "fetch", "author"]);
        assert!(results.iter().all(|r| r.success), "{results:?}");
        assert_eq!(results[0].variables["post_id"], "42");
        assert!(!results[1].variables.contains_key("post_id"));
        assert_eq!(
            *client.seen.lock(),
            vec!["/acme/posts", "/posts/42", "/users/u1"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_handles_deep_chains() {
        let (executor, _) = executor(chain_client());
        let suite = chain_suite().concurrent(4);
        let results = executor.execute(&suite).await.unwrap();

        assert_eq!(names(&results), vec!["author", "create", "fetch"]);
        assert!(results.iter().all(|r| r.success), "{results:?}");
    }

    #[tokio::test]
    async fn test_failed_or_missing_dependency_blocks_transitively() {
        let suite = TestSuite::new("blocked", "http://api.test")
            .with_test(
                TestCase::new("broken", "/missing").with_assertion(Assertion::status_code(200)),
            )
            .with_test(TestCase::new("after-broken", "/ok").depends_on("broken"))
            .with_test(TestCase::new("after-after", "/ok").depends_on("after-broken"))
            .with_test(TestCase::new("ghost-dep", "/ok").depends_on("ghost"))
            .with_test(TestCase::new("fine", "/ok"));

        for concurrent in [false, true] {
            let (executor, client) = executor(ScriptedClient::default().route("/ok", 200, ""));
            let mut suite = suite.clone();
            suite.concurrent = concurrent;
            let results = executor.execute(&suite).await.unwrap();

            let mut executed = names(&results);
            executed.sort_unstable();
            assert_eq!(executed, vec!["broken", "fine"]);
            assert!(!results.iter().find(|r| r.name == "broken").unwrap().success);
            assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        }
    }

    #[tokio::test]
    async fn test_sequential_does_not_look_ahead() {
        let (executor, client) = executor(ScriptedClient::default().route("/ok", 200, ""));
        let suite = TestSuite::new("order", "http://api.test")
            .with_test(TestCase::new("early", "/ok").depends_on("late"))
            .with_test(TestCase::new("late", "/ok"));

        let results = executor.execute(&suite).await.unwrap();
        assert_eq!(names(&results), vec!["late"]);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_worker_pool_is_bounded() {
        let mut suite = TestSuite::new("pool", "http://api.test").concurrent(3);
        for i in 0..12 {
            suite = suite.with_test(TestCase::new(format!("t{i:02}"), "/ok"));
        }
        let (executor, client) = executor(
            ScriptedClient::default()
                .route("/ok", 200, "")
                .with_latency(Duration::from_millis(20)),
        );

        let results = executor.execute(&suite).await.unwrap();
        assert_eq!(results.len(), 12);
        assert_eq!(results[0].name, "t00");
        assert_eq!(results[11].name, "t11");
        assert!(client.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(client.calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_cycle_skips_only_its_members() {
        let suite = TestSuite::new("cyclic", "http://api.test")
            .with_test(TestCase::new("a", "/a").depends_on("b"))
            .with_test(TestCase::new("fine", "/ok"))
            .with_test(TestCase::new("b", "/b").depends_on("a"))
            .with_test(TestCase::new("behind", "/ok").depends_on("b"))
            .with_test(TestCase::new("after-fine", "/ok").depends_on("fine"));

        for concurrent in [false, true] {
            let (executor, client) = executor(ScriptedClient::default().route("/ok", 200, ""));
            let mut suite = suite.clone();
            suite.concurrent = concurrent;
            let results = executor.execute(&suite).await.unwrap();

            let mut executed = names(&results);
            executed.sort_unstable();
            assert_eq!(executed, vec!["after-fine", "fine"]);
            assert!(results.iter().all(|r| r.success), "{results:?}");
            assert_eq!(*client.seen.lock(), vec!["/ok", "/ok"]);
        }
    }

    #[tokio::test]
    async fn test_dependency_variables_override_globals() {
        let (executor, client) = executor(
            ScriptedClient::default()
                .route("/token", 200, r#"{"t":"dep"}"#)
                .route("/dep", 200, ""),
        );
        let suite = TestSuite::new("override", "http://api.test")
            .with_variable("t", "global")
            .with_test(TestCase::new("issue", "/token").with_extraction("t", "json:t"))
            .with_test(TestCase::new("use", "/${t}").depends_on("issue"));

        let results = executor.execute(&suite).await.unwrap();
        assert!(results.iter().all(|r| r.success), "{results:?}");
        assert_eq!(*client.seen.lock(), vec!["/token", "/dep"]);
    }

    #[tokio::test]
    async fn test_duplicate_names_fail_before_any_request() {
        let (executor, client) = executor(ScriptedClient::default());
        let duplicated = TestSuite::new("dup", "http://api.test")
            .with_test(TestCase::new("a", "/a"))
            .with_test(TestCase::new("a", "/b"));
        assert_eq!(
            executor.execute(&duplicated).await,
            Err(SchedulerError::DuplicateTest("a".to_string()))
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_assertions() {
        let (executor, _) = executor(ScriptedClient::default().route("/ok", 200, "not json"));
        let test = TestCase::new("t", "/ok")
            .with_extraction("id", "json:id")
            .with_assertion(Assertion::status_code(500));

        let result = executor
            .run_single(&test, "http://api.test", &Variables::new())
            .await;
        assert!(!result.success);
        assert!(result
            .error_message()
            .starts_with("variable extraction failed: failed to extract variable id"));
    }

    #[tokio::test]
    async fn test_assertion_failures_are_joined() {
        let (executor, _) = executor(ScriptedClient::default().route("/ok", 200, "{}"));
        let test = TestCase::new("t", "/ok")
            .with_assertion(Assertion::status_code(201))
            .with_assertion(Assertion::new("body_contains").with_expected("x"));

        let result = executor
            .run_single(&test, "http://api.test", &Variables::new())
            .await;
        assert!(!result.success);
        assert_eq!(result.status_code, 200);
        assert_eq!(
            result.error_message(),
            "assertions failed: status code assertion failed: expected 201, got 200; \
             body does not contain expected text: x"
        );
    }
}

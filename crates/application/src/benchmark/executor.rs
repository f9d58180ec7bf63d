use std::sync::Arc;
use std::time::{Duration, Instant};

use apiprobe_domain::{Benchmark, BenchmarkResult, RequestSample, TestCase, Variables, Workload};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{BenchmarkError, aggregate};
use crate::ports::{FileSystem, HttpClient};
use crate::request_executor::{RequestExecutor, is_absolute};

/// Capacity of the sample channel. The collector drains it while workers run.
const SAMPLE_BUFFER: usize = 1024;

/// Inputs shared by every worker of one benchmark.
struct Attempt<C: HttpClient, F: FileSystem> {
    requests: Arc<RequestExecutor<C, F>>,
    base_url: Arc<str>,
    template: TestCase,
    variables: Variables,
}

impl<C: HttpClient, F: FileSystem> Attempt<C, F> {
    /// Issues one request and times it.
    async fn run(&self) -> RequestSample {
        let start = Instant::now();
        let outcome = self
            .requests
            .send(&self.template, &self.base_url, &self.variables)
            .await;
        let duration = start.elapsed();
        match outcome {
            Ok(response) => RequestSample {
                success: true,
                duration,
                status_code: response.status,
                bytes: response.body.len(),
            },
            Err(error) => {
                debug!(benchmark = %self.template.name, %error, "benchmark request failed");
                RequestSample {
                    success: false,
                    duration,
                    status_code: 0,
                    bytes: 0,
                }
            }
        }
    }
}

/// Use case for running benchmark batches.
///
/// Relative benchmark URLs are joined to the base URL the same way test URLs
/// are joined to a suite's base URL.
pub struct BenchmarkExecutor<C: HttpClient, F: FileSystem> {
    requests: Arc<RequestExecutor<C, F>>,
    base_url: Arc<str>,
}

impl<C, F> BenchmarkExecutor<C, F>
where
    C: HttpClient + 'static,
    F: FileSystem + 'static,
{
    /// Creates a new executor over the given ports.
    pub fn new(client: Arc<C>, fs: Arc<F>) -> Self {
        Self {
            requests: Arc::new(RequestExecutor::new(client, fs)),
            base_url: Arc::from(""),
        }
    }

    /// Sets the base URL relative benchmark URLs are resolved against.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Arc::from(base_url);
        self
    }

    /// Runs the benchmarks one after another and returns their results.
    ///
    /// The whole batch is validated before any load is generated.
    ///
    /// # Errors
    ///
    /// Returns [`BenchmarkError::Config`] for the first misconfigured
    /// benchmark, [`BenchmarkError::RelativeUrl`] for a relative URL with no
    /// base URL to resolve it, or [`BenchmarkError::Worker`] if a worker task
    /// dies.
    pub async fn execute_benchmarks(
        &self,
        benchmarks: &[Benchmark],
        variables: &Variables,
    ) -> Result<Vec<BenchmarkResult>, BenchmarkError> {
        let workloads = benchmarks
            .iter()
            .map(|benchmark| {
                if self.base_url.is_empty() && !is_absolute(&benchmark.url) {
                    return Err(BenchmarkError::RelativeUrl {
                        name: benchmark.name.clone(),
                        url: benchmark.url.clone(),
                    });
                }
                benchmark
                    .workload()
                    .map_err(|source| BenchmarkError::Config {
                        name: benchmark.name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut results = Vec::with_capacity(benchmarks.len());
        for (benchmark, workload) in benchmarks.iter().zip(workloads) {
            results.push(self.run(benchmark, workload, variables).await?);
        }
        Ok(results)
    }

    /// Runs one validated benchmark.
    async fn run(
        &self,
        benchmark: &Benchmark,
        workload: Workload,
        variables: &Variables,
    ) -> Result<BenchmarkResult, BenchmarkError> {
        let workers = benchmark.worker_count();
        info!(
            benchmark = %benchmark.name,
            ?workload,
            workers,
            "starting benchmark"
        );

        let attempt = Arc::new(Attempt {
            requests: Arc::clone(&self.requests),
            base_url: Arc::clone(&self.base_url),
            template: benchmark.request_template(),
            variables: variables.clone(),
        });
        let (sample_tx, mut sample_rx) = mpsc::channel(SAMPLE_BUFFER);

        let started = Instant::now();
        let handles = match workload {
            Workload::FixedCount(total) => spawn_counted(&attempt, &sample_tx, total, workers),
            Workload::FixedDuration(duration) => {
                spawn_timed(&attempt, &sample_tx, duration, workers)
            }
        };
        drop(sample_tx);

        let mut samples = Vec::new();
        while let Some(sample) = sample_rx.recv().await {
            samples.push(sample);
        }
        for handle in handles {
            handle
                .await
                .map_err(|e| BenchmarkError::Worker(e.to_string()))?;
        }
        let total_time = started.elapsed();

        let result = aggregate(&benchmark.name, &samples, total_time);
        info!(
            benchmark = %result.name,
            total = result.total_requests,
            failed = result.failed_requests,
            rps = result.requests_per_second,
            "benchmark finished"
        );
        Ok(result)
    }
}

/// Splits `total` across `workers`, the first `total % workers` getting one extra.
fn split_requests(total: u64, workers: usize) -> Vec<u64> {
    let workers_u64 = workers.max(1) as u64;
    let base = total / workers_u64;
    let remainder = total % workers_u64;
    (0..workers_u64)
        .map(|i| base + u64::from(i < remainder))
        .collect()
}

fn spawn_counted<C, F>(
    attempt: &Arc<Attempt<C, F>>,
    sample_tx: &mpsc::Sender<RequestSample>,
    total: u64,
    workers: usize,
) -> Vec<JoinHandle<()>>
where
    C: HttpClient + 'static,
    F: FileSystem + 'static,
{
    split_requests(total, workers)
        .into_iter()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .map(|(worker, count)| {
            let attempt = Arc::clone(attempt);
            let sample_tx = sample_tx.clone();
            tokio::spawn(async move {
                for _ in 0..count {
                    let sample = attempt.run().await;
                    if sample_tx.send(sample).await.is_err() {
                        break;
                    }
                }
                debug!(worker, requests = count, "benchmark worker finished");
            })
        })
        .collect()
}

fn spawn_timed<C, F>(
    attempt: &Arc<Attempt<C, F>>,
    sample_tx: &mpsc::Sender<RequestSample>,
    duration: Duration,
    workers: usize,
) -> Vec<JoinHandle<()>>
where
    C: HttpClient + 'static,
    F: FileSystem + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        stop_tx.send_replace(true);
    });

    (0..workers)
        .map(|worker| {
            let attempt = Arc::clone(attempt);
            let sample_tx = sample_tx.clone();
            let stop_rx = stop_rx.clone();
            tokio::spawn(async move {
                let mut issued = 0u64;
                loop {
                    let stopped = *stop_rx.borrow();
                    if stopped {
                        break;
                    }
                    let sample = attempt.run().await;
                    issued += 1;
                    if sample_tx.send(sample).await.is_err() {
                        break;
                    }
                    // Requests that complete without suspending must not starve the timer.
                    tokio::task::yield_now().await;
                }
                debug!(worker, requests = issued, "benchmark worker finished");
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::future::Future;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use apiprobe_domain::{DomainError, RequestSpec, ResponseHeaders, ResponseSpec};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ports::{FileSystemError, HttpClientError};

    /// Counts calls and fails every `fail_every`th one.
    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
        fail_every: usize,
        latency: Duration,
        urls: parking_lot::Mutex<Vec<String>>,
    }

    impl HttpClient for CountingClient {
        fn execute(
            &self,
            request: &RequestSpec,
        ) -> impl Future<Output = Result<ResponseSpec, HttpClientError>> + Send {
            self.urls.lock().push(request.url.clone());
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let fail = self.fail_every > 0 && call % self.fail_every == 0;
            let latency = self.latency;
            async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                if fail {
                    Err(HttpClientError::ConnectionFailed("reset".to_string()))
                } else {
                    Ok(ResponseSpec::new(
                        200,
                        ResponseHeaders::new(),
                        b"pong",
                        latency,
                    ))
                }
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
        client: CountingClient,
    ) -> (BenchmarkExecutor<CountingClient, NoFiles>, Arc<CountingClient>) {
        let client = Arc::new(client);
        (
            BenchmarkExecutor::new(Arc::clone(&client), Arc::new(NoFiles)),
            client,
        )
    }

    #[test]
    fn test_split_requests_spreads_remainder() {
        assert_eq!(split_requests(10, 3), vec![4, 3, 3]);
        assert_eq!(split_requests(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_requests(9, 0), vec![9]);
    }

    #[tokio::test]
    async fn test_fixed_count_issues_exact_total() {
        let (executor, client) = executor(CountingClient {
            fail_every: 5,
            ..CountingClient::default()
        });
        let benchmarks =
            [Benchmark::new("ping", "http://localhost/${path}", 10).with_concurrency(3)];
        let vars = Variables::from([("path".to_string(), "ping".to_string())]);

        let results = executor.execute_benchmarks(&benchmarks, &vars).await.unwrap();

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.name, "ping");
        assert_eq!(result.total_requests, 10);
        assert_eq!(result.successful_requests, 8);
        assert_eq!(result.failed_requests, 2);
        assert_eq!(client.calls.load(Ordering::SeqCst), 10);
        assert!(client
            .urls
            .lock()
            .iter()
            .all(|url| url == "http://localhost/ping"));
    }

    #[tokio::test]
    async fn test_fixed_duration_stops_after_timer() {
        let (executor, client) = executor(CountingClient {
            latency: Duration::from_millis(10),
            ..CountingClient::default()
        });
        let benchmarks = [Benchmark::new("soak", "http://localhost/", 0)
            .for_duration(Duration::from_millis(100))
            .with_concurrency(2)];

        let results = executor
            .execute_benchmarks(&benchmarks, &Variables::new())
            .await
            .unwrap();

        let result = &results[0];
        assert!(result.total_requests > 0);
        assert_eq!(
            result.total_requests,
            client.calls.load(Ordering::SeqCst) as u64
        );
        assert!(result.total_time >= Duration::from_millis(100));
        assert!(result.requests_per_second > 0.0);
    }

    #[tokio::test]
    async fn test_batch_is_validated_before_any_load() {
        let (executor, client) = executor(CountingClient::default());
        let mut invalid = Benchmark::new("both", "http://localhost/", 5);
        invalid.duration = Some(Duration::from_secs(1));
        let benchmarks = [Benchmark::new("fine", "http://localhost/", 5), invalid];

        let error = executor
            .execute_benchmarks(&benchmarks, &Variables::new())
            .await
            .unwrap_err();

        assert_eq!(
            error,
            BenchmarkError::Config {
                name: "both".to_string(),
                source: DomainError::ConflictingWorkload,
            }
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_relative_url_joins_base_url() {
        let (executor, client) = executor(CountingClient::default());
        let executor = executor.with_base_url("http://localhost:8080/");
        let benchmarks = [
            Benchmark::new("rel", "/ping", 3),
            Benchmark::new("abs", "http://other/health", 1),
        ];

        let results = executor
            .execute_benchmarks(&benchmarks, &Variables::new())
            .await
            .unwrap();

        assert_eq!(results[0].successful_requests, 3);
        assert_eq!(results[1].successful_requests, 1);
        assert_eq!(
            *client.urls.lock(),
            vec![
                "http://localhost:8080/ping",
                "http://localhost:8080/ping",
                "http://localhost:8080/ping",
                "http://other/health",
            ]
        );
    }

    #[tokio::test]
    async fn test_relative_url_without_base_is_rejected() {
        let (executor, client) = executor(CountingClient::default());
        let benchmarks = [
            Benchmark::new("abs", "http://localhost/", 2),
            Benchmark::new("rel", "/ping", 3),
        ];

        let error = executor
            .execute_benchmarks(&benchmarks, &Variables::new())
            .await
            .unwrap_err();

        assert_eq!(
            error,
            BenchmarkError::RelativeUrl {
                name: "rel".to_string(),
                url: "/ping".to_string(),
            }
        );
        assert_eq!(
            error.to_string(),
            "benchmark rel has relative URL '/ping' but no base URL"
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_concurrency_runs_one_worker() {
        let (executor, client) = executor(CountingClient::default());
        let benchmarks = [Benchmark::new("solo", "http://localhost/", 4).with_concurrency(0)];

        let results = executor
            .execute_benchmarks(&benchmarks, &Variables::new())
            .await
            .unwrap();
        assert_eq!(results[0].total_requests, 4);
        assert_eq!(client.calls.load(Ordering::SeqCst), 4);
    }
}

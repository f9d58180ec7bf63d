use std::time::Duration;

use apiprobe_domain::{BenchmarkResult, RequestSample};

/// Folds the collected samples of one run into its result.
///
/// `total_time` is the wall-clock time of the whole run. The average response
/// time is `total_time / attempts`, which tracks pool throughput rather than
/// the mean single-request latency.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(name: &str, samples: &[RequestSample], total_time: Duration) -> BenchmarkResult {
    let Some(first) = samples.first() else {
        return BenchmarkResult::empty(name);
    };

    let mut min = first.duration;
    let mut max = first.duration;
    let mut successful = 0u64;
    for sample in samples {
        min = min.min(sample.duration);
        max = max.max(sample.duration);
        if sample.success {
            successful += 1;
        }
    }

    let total = samples.len() as u64;
    let avg_nanos = total_time.as_nanos() / u128::from(total);
    let seconds = total_time.as_secs_f64();

    BenchmarkResult {
        name: name.to_string(),
        total_requests: total,
        successful_requests: successful,
        failed_requests: total - successful,
        min_response_time: min,
        max_response_time: max,
        avg_response_time: Duration::from_nanos(u64::try_from(avg_nanos).unwrap_or(u64::MAX)),
        total_time,
        requests_per_second: if seconds > 0.0 {
            total as f64 / seconds
        } else {
            0.0
        },
    }
}

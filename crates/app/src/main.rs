//! Apiprobe - Main Entry Point
//!
//! Loads a test suite (and optionally a benchmark plan), runs it against the
//! real HTTP transport, and exits non-zero when any test fails.

mod config;

use std::process::ExitCode;
use std::sync::Arc;

use apiprobe_application::{BenchmarkExecutor, SuiteExecutor};
use apiprobe_domain::{BenchmarkResult, RunSummary, TestResult};
use apiprobe_infrastructure::{
    ReqwestHttpClient, TokioFileSystem, load_benchmarks, load_suite, to_json_stable,
};
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting apiprobe v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match AppConfig::from_env() {
        Ok(config) => run(&config).await,
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the configured suite and benchmarks; returns whether every test passed.
async fn run(config: &AppConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let mut suite = load_suite(&config.suite).await?;
    config.apply(&mut suite);

    let client = Arc::new(ReqwestHttpClient::new()?);
    let fs = Arc::new(TokioFileSystem::new());

    let results = if suite.is_empty() {
        Vec::new()
    } else {
        SuiteExecutor::new(Arc::clone(&client), Arc::clone(&fs))
            .execute(&suite)
            .await?
    };
    report_tests(&results);

    let benchmarks = match &config.benchmarks {
        Some(path) => {
            let plan = load_benchmarks(path).await?;
            BenchmarkExecutor::new(client, fs)
                .with_base_url(&suite.base_url)
                .execute_benchmarks(&plan, &suite.variables)
                .await?
        }
        None => Vec::new(),
    };
    report_benchmarks(&benchmarks);

    if let Some(path) = &config.report {
        let report = json!({
            "suite": suite.name,
            "tests": results,
            "benchmarks": benchmarks,
        });
        tokio::fs::write(path, to_json_stable(&report)?).await?;
        info!(path = %path.display(), "report written");
    }

    Ok(RunSummary::from_results(&results).all_passed())
}

fn report_tests(results: &[TestResult]) {
    for result in results {
        if result.success {
            info!(
                test = %result.name,
                status = result.status_code,
                duration_ms = %result.duration.as_millis(),
                "PASS"
            );
        } else {
            warn!(test = %result.name, error = result.error_message(), "FAIL");
        }
    }

    let summary = RunSummary::from_results(results);
    info!(
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        pass_rate = %format!("{:.1}%", summary.pass_rate()),
        "tests finished"
    );
}

fn report_benchmarks(results: &[BenchmarkResult]) {
    for result in results {
        info!(
            benchmark = %result.name,
            requests = result.total_requests,
            success_rate = %format!("{:.1}%", result.success_rate()),
            min_ms = %result.min_response_time.as_millis(),
            max_ms = %result.max_response_time.as_millis(),
            avg_ms = %result.avg_response_time.as_millis(),
            rps = %format!("{:.2}", result.requests_per_second),
            "benchmark finished"
        );
    }
}

//! Apiprobe Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus suite and benchmark loading.

pub mod adapters;
pub mod serialization;

pub use adapters::{DEFAULT_TIMEOUT, ReqwestHttpClient, TokioFileSystem};
pub use serialization::{
    Format, SerializationError, from_json, from_yaml, load_benchmarks, load_suite,
    parse_benchmarks, parse_suite, to_json_stable,
};

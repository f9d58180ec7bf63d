//! Port implementations backed by real I/O.

mod file_system;
mod reqwest_client;

pub use file_system::TokioFileSystem;
pub use reqwest_client::{DEFAULT_TIMEOUT, ReqwestHttpClient};

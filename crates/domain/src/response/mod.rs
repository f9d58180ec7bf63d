//! HTTP Response domain types

mod headers;
mod spec;

pub use headers::ResponseHeaders;
pub use spec::ResponseSpec;

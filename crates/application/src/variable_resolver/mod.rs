//! Variable resolution module
//!
//! Provides parsing and substitution of `${variable}` placeholders.
//!
//! # Usage
//!
//! ```
//! use apiprobe_application::variable_resolver::VariableResolver;
//! use apiprobe_domain::Variables;
//!
//! let mut variables = Variables::new();
//! variables.insert("host".to_string(), "localhost".to_string());
//!
//! let resolver = VariableResolver::new(&variables);
//! assert_eq!(resolver.resolve("http://${host}/api"), "http://localhost/api");
//! ```

pub mod engine;
pub mod parser;

pub use engine::{VariableResolver, interpolate};
pub use parser::{VariableReference, parse_variables, single_placeholder};

//! Process-wide logging setup shared by the binaries and black-box tests.

pub mod tracing;

pub use crate::tracing::{DEFAULT_FILTER, init, init_with_default};

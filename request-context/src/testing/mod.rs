//! Testing utilities for context isolation.
//!
//! This module provides:
//! - A parallel runner that starts many units of work at once
//! - Leak assertions over the values those units observed

mod leak;
mod parallel;

pub use leak::{assert_no_leak, assert_no_leak_by};
pub use parallel::{run_parallel, run_parallel_spawned};

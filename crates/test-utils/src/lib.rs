//! Shared test utilities for the povplot workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Reference meshes and cameras
//! - Mesh generators
//! - Fake renderers, in-process and as shell scripts
//! - Skip macros for tests that need a real `povray`
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your integration tests:
//!
//! ```ignore
//! use test_utils::{require_povray, square_mesh};
//! ```

pub mod fakes;
pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fakes::*;
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Skip the current test when no `povray` binary can be found.
///
/// Evaluates to the binary's path.
///
/// ```ignore
/// #[tokio::test]
/// async fn test_real_render() {
///     let povray = require_povray!();
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! require_povray {
    () => {{
        match $crate::find_povray() {
            Some(path) => path,
            None => {
                eprintln!("SKIPPED: povray not found. Install POV-Ray or set POVPLOT_POVRAY.");
                return;
            }
        }
    }};
}

/// Skip the current test on platforms without `/bin/sh`.
#[macro_export]
macro_rules! require_shell {
    () => {{
        if !cfg!(unix) {
            eprintln!("SKIPPED: fake renderer scripts need a unix shell.");
            return;
        }
    }};
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert two RGB(A) pixels differ by at most `tolerance` per channel.
#[macro_export]
macro_rules! assert_color_near {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left = $left;
        let right = $right;
        let diff = $crate::max_channel_diff(&left[..], &right[..]);
        if diff > $tolerance {
            panic!(
                "assertion failed: colors differ by {} > {}\n  left: `{:?}`,\n right: `{:?}`",
                diff, $tolerance, left, right
            );
        }
    }};
}

/// Largest absolute difference over the channels both colors have.
pub fn max_channel_diff(a: &[u8], b: &[u8]) -> u8 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

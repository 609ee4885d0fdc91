//! Mathematical utilities for Clearway
//!
//! Polyline measures shared by the curve builder, the planners and the tests.

pub mod polyline;

pub use polyline::*;

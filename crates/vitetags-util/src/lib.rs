#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for vitetags.
//!
//! Pure helper functions with no logging/tracing dependencies so the core
//! library decides what gets reported.

pub mod fs;
pub mod hash;

//! Build integration tests.
//!
//! Builds run against a shell script standing in for the bundler, so they are
//! only compiled on Unix.

#![cfg(unix)]

mod build_tests;
mod common;

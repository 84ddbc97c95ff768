//! Shared fixtures for the lock tests and the `anchor_fixture` binary.

pub mod fixtures;

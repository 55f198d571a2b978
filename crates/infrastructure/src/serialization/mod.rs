//! Deterministic JSON for files the session core writes.
//!
//! Storage and settings files are written with sorted keys (via `BTreeMap`
//! or declaration order), 2-space indentation and a trailing newline so
//! repeated writes of the same data produce identical bytes.

mod json;

pub use json::*;

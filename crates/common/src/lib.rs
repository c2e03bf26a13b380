//! Shared plumbing for the Curate binaries.

pub mod logging;

//! DuplicateAgent - duplicate file finder with a reversible fake trash.
//!
//! The library has two engines:
//! - [`duplicates`]: a cancellable background scan that walks directories,
//!   buckets files by size and confirms duplicates by BLAKE3 content hash
//! - [`trash`]: a per-mount, journal-backed trash supporting move, restore
//!   and purge
//!
//! The `dupagent` binary is a thin presenter over both (see [`run_app`]).

pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod trash;

pub use app::run_app;

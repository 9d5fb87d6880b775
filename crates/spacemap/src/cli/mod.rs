//! CLI module for spacemap
//!
//! Every command works on a JSON state file holding a `MemoryStore`
//! snapshot. Commands taking `--json` print a single JSON document on stdout.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod migrate;
pub mod output;
pub mod show;

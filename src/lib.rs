//! Nomad chains: single-input, single-output nodes wrapping unary functions,
//! linked backwards into pipelines and evaluated depth-first.

pub mod chain;
pub mod config;
pub mod demo;
pub mod diagnostics;
pub mod report;

pub type Result<T> = anyhow::Result<T>;

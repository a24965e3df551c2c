//! Chains of unary-function nodes.
//!
//! A node holds one transform, one input, one output and an optional link to
//! the upstream node whose output becomes its input. Chains are evaluated
//! backwards: asking a node for its value first evaluates everything upstream
//! of it.

pub mod arena;
pub mod error;
pub mod node;
#[cfg(test)]
mod tests;

pub use arena::{Chain, NodeId};
pub use error::ChainError;
pub use node::{Node, Transform};

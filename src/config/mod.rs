//! Config layer: chain description files and the transform expressions they use.
//!
//! Kept apart from the chain itself, which knows nothing about JSON. It owns:
//! - ChainSpec (raw chain.json) and BuiltChain (validated, linked chain)
//! - transform expression parsing

pub mod chain_file;
pub mod transform;

pub use chain_file::{BuiltChain, ChainSpec, NodeSpec};
pub use transform::{Expr, ExprParser, Op, parse_expr};

//! The reference wiring: four nodes in one chain, each evaluated on its own.
//!
//! adder (x + 1, seeded 20) -> passthru -> divider (x / 3) -> multiplier (x * 100)
//!
//! Transforms are the same wrapping expressions chain files use, so the demo
//! and `run` agree on every input.

use crate::Result;
use crate::chain::{Chain, NodeId};
use crate::config::{Expr, Op};
use crate::report::{self, Evaluation};

pub const REFERENCE_SEED: i64 = 20;

/// Build the chain and return it with the report order (last-linked node first).
pub fn reference_chain(seed: i64) -> Result<(Chain<i64>, Vec<NodeId>)> {
    let mut chain = Chain::new();

    // The head is the only node that takes an assigned input.
    let adder = chain.add("Adder", Expr::binary(Op::Add, 1)?.into_transform());
    chain.assign(adder, seed)?;

    let divider = chain.add("Divider", Expr::binary(Op::Div, 3)?.into_transform());
    let passthru = chain.passthrough("Passthru");
    let multiplier = chain.add("Multiplier", Expr::binary(Op::Mul, 100)?.into_transform());

    chain.pipeline(&[adder, passthru, divider, multiplier])?;

    Ok((chain, vec![multiplier, divider, passthru, adder]))
}

pub fn run() -> Result<Vec<Evaluation<i64>>> {
    let (mut chain, order) = reference_chain(REFERENCE_SEED)?;
    Ok(report::evaluate(&mut chain, &order)?)
}

//! Evaluation results and their console rendering.

use crate::chain::{Chain, ChainError, NodeId};
use serde::Serialize;
use std::fmt::{Display, Write};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation<T> {
    pub label: String,
    pub value: T,
    /// Links between the node and its chain head.
    pub depth: usize,
}

/// Evaluate each node in `order` independently (every call re-walks its upstream prefix).
pub fn evaluate<T: Clone + Default>(
    chain: &mut Chain<T>,
    order: &[NodeId],
) -> Result<Vec<Evaluation<T>>, ChainError> {
    let mut out = Vec::with_capacity(order.len());
    for &id in order {
        let value = chain.eval(id)?;
        out.push(Evaluation {
            label: chain.label(id)?.to_string(),
            value,
            depth: chain.depth(id)?,
        });
    }
    Ok(out)
}

/// One `"<Label> <value>"` line per evaluation.
pub fn render_text<T: Display>(evals: &[Evaluation<T>]) -> String {
    let mut out = String::new();
    for e in evals {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{} {}", e.label, e.value);
    }
    out
}

pub fn render_json<T: Serialize>(evals: &[Evaluation<T>]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(evals)?)
}

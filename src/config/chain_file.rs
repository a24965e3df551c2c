//! Chain description file (chain.json).
//!
//! JSON shape:
//! {
//!   "nodes": [
//!     {
//!       "name": "adder",          // unique key, referenced by `upstream` and `eval`
//!       "label": "Adder",         // optional, printed in the report (defaults to name)
//!       "transform": "x + 1",     // optional, absent means pass-through
//!       "upstream": null,         // optional, name of the node feeding this one
//!       "seed": 20                // optional, initial input (only useful on heads)
//!     },
//!     ...
//!   ],
//!   "eval": ["adder"]            // optional, nodes to report, in order
//! }
//!
//! We parse transforms, check names, link nodes (cycles are rejected by the
//! chain itself) and resolve the evaluation order. When `eval` is empty every
//! node is reported, last declared first.

use crate::chain::{Chain, NodeId};
use crate::config::transform::ExprParser;
use crate::diagnostics;
use crate::Result;

use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainSpec {
    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub eval: Vec<String>,
}

/// Raw node shape as it appears in chain.json.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub name: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub transform: Option<String>,

    #[serde(default)]
    pub upstream: Option<String>,

    #[serde(default)]
    pub seed: Option<i64>,
}

/// Linked, seeded chain ready for evaluation.
#[derive(Debug)]
pub struct BuiltChain {
    pub chain: Chain<i64>,
    /// name -> id
    pub ids: BTreeMap<String, NodeId>,
    pub eval_order: Vec<NodeId>,
    /// Non-fatal problems found while building; also emitted as diagnostics.
    pub warnings: Vec<String>,
}

impl ChainSpec {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("read chain file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parse chain file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate the description and build the chain:
    /// - at least one node, unique names
    /// - transforms parse
    /// - upstream and eval names exist
    /// - links are acyclic
    pub fn validate_and_build(&self) -> Result<BuiltChain> {
        if self.nodes.is_empty() {
            bail!("chain file must contain at least 1 node");
        }

        // 1) Nodes.
        let parser = ExprParser::new()?;
        let mut chain = Chain::new();
        let mut ids = BTreeMap::<String, NodeId>::new();
        for n in &self.nodes {
            if ids.contains_key(&n.name) {
                bail!("duplicate node name in chain file: {}", n.name);
            }
            let transform = match &n.transform {
                Some(text) => parser
                    .parse(text)
                    .with_context(|| format!("node {}", n.name))?
                    .into_transform(),
                None => None,
            };
            let label = n.label.clone().unwrap_or_else(|| n.name.clone());
            ids.insert(n.name.clone(), chain.add(label, transform));
        }

        // 2) Links, checked for cycles as one batch.
        let mut links = Vec::new();
        for n in &self.nodes {
            let Some(up) = &n.upstream else { continue };
            let Some(&upstream) = ids.get(up) else {
                bail!("node {} references unknown upstream node: {}", n.name, up);
            };
            links.push((ids[&n.name], upstream));
        }
        chain.link_many(&links).context("link chain file nodes")?;

        // 3) Seeds.
        let mut warnings = Vec::new();
        for n in &self.nodes {
            let Some(seed) = n.seed else { continue };
            if n.upstream.is_some() {
                warnings.push(format!(
                    "node {} has both a seed and an upstream; the seed is overwritten on eval",
                    n.name
                ));
            }
            chain.assign(ids[&n.name], seed)?;
        }
        for w in &warnings {
            diagnostics::warn(w);
        }

        // 4) Evaluation order.
        let eval_order = if self.eval.is_empty() {
            self.nodes.iter().rev().map(|n| ids[&n.name]).collect()
        } else {
            let mut order = Vec::with_capacity(self.eval.len());
            for name in &self.eval {
                match ids.get(name) {
                    Some(&id) => order.push(id),
                    None => bail!("eval references unknown node: {}", name),
                }
            }
            order
        };

        Ok(BuiltChain {
            chain,
            ids,
            eval_order,
            warnings,
        })
    }
}

impl BuiltChain {
    /// Assign `value` to every chain head, replacing file seeds.
    pub fn seed_heads(&mut self, value: i64) -> Result<()> {
        let heads: Vec<NodeId> = self
            .chain
            .ids()
            .filter(|&id| matches!(self.chain.upstream(id), Ok(None)))
            .collect();
        for id in heads {
            self.chain.assign(id, value)?;
        }
        Ok(())
    }

    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }
}

//! Transform expressions used in chain files.
//!
//! Accepted forms (whitespace-insensitive), with `n` an integer literal:
//! `x`, `x + n`, `x - n`, `x * n`, `x / n`, `x % n`
//!
//! Arithmetic wraps on overflow; `/` truncates toward zero.

use anyhow::{Context, bail};
use regex::Regex;
use std::fmt;

use crate::chain::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Op {
    fn symbol(self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
            Op::Rem => '%',
        }
    }
}

/// Parsed transform expression over `i64`.
///
/// Built only through [`Expr::binary`], [`Expr::IDENTITY`] or the parser, so a
/// zero divisor never reaches [`Expr::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expr(Option<(Op, i64)>);

impl Expr {
    pub const IDENTITY: Expr = Expr(None);

    pub fn binary(op: Op, n: i64) -> anyhow::Result<Self> {
        if matches!(op, Op::Div | Op::Rem) && n == 0 {
            bail!("division by zero in transform \"x {} 0\"", op.symbol());
        }
        Ok(Expr(Some((op, n))))
    }

    pub fn op(self) -> Option<Op> {
        self.0.map(|(op, _)| op)
    }

    pub fn operand(self) -> Option<i64> {
        self.0.map(|(_, n)| n)
    }

    pub fn apply(self, x: i64) -> i64 {
        match self.0 {
            None => x,
            Some((Op::Add, n)) => x.wrapping_add(n),
            Some((Op::Sub, n)) => x.wrapping_sub(n),
            Some((Op::Mul, n)) => x.wrapping_mul(n),
            Some((Op::Div, n)) => x.wrapping_div(n),
            Some((Op::Rem, n)) => x.wrapping_rem(n),
        }
    }

    /// `None` for the identity, so the node becomes a pass-through.
    pub fn into_transform(self) -> Option<Transform<i64>> {
        self.0?;
        let f: Transform<i64> = Box::new(move |x| self.apply(x));
        Some(f)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("x"),
            Some((op, n)) => write!(f, "x {} {}", op.symbol(), n),
        }
    }
}

/// Transform parser holding its compiled pattern; build once, parse many.
#[derive(Debug, Clone)]
pub struct ExprParser {
    re: Regex,
}

impl ExprParser {
    pub fn new() -> anyhow::Result<Self> {
        // Capture:
        // 1) operator (optional; absent means identity)
        // 2) integer operand
        let re = Regex::new(r#"^\s*x\s*(?:([-+*/%])\s*(-?[0-9]+))?\s*$"#)?;
        Ok(Self { re })
    }

    pub fn parse(&self, text: &str) -> anyhow::Result<Expr> {
        let caps = match self.re.captures(text) {
            Some(c) => c,
            None => bail!("cannot parse transform {:?} (expected e.g. \"x + 1\")", text),
        };

        let (Some(op), Some(operand)) = (caps.get(1), caps.get(2)) else {
            return Ok(Expr::IDENTITY);
        };

        let n: i64 = operand
            .as_str()
            .parse()
            .with_context(|| format!("bad operand in transform {:?}", text))?;

        let op = match op.as_str() {
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "/" => Op::Div,
            "%" => Op::Rem,
            other => bail!("unsupported operator {:?} in transform {:?}", other, text),
        };

        Expr::binary(op, n)
    }
}

/// One-off parse; use [`ExprParser`] when parsing many transforms.
pub fn parse_expr(text: &str) -> anyhow::Result<Expr> {
    ExprParser::new()?.parse(text)
}

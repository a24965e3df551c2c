//! Chain evaluation, linking and cycle rejection.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use crate::chain::{Chain, ChainError, NodeId};

fn counted(calls: &Rc<Cell<u32>>, f: impl Fn(i64) -> i64 + 'static) -> impl Fn(i64) -> i64 + 'static {
    let calls = Rc::clone(calls);
    move |x| {
        calls.set(calls.get() + 1);
        f(x)
    }
}

fn reference() -> (Chain<i64>, [NodeId; 4]) {
    let mut chain: Chain<i64> = Chain::new();
    let adder = chain.node("Adder", |a| a + 1);
    let passthru = chain.passthrough("Passthru");
    let divider = chain.node("Divider", |x| x / 3);
    let multiplier = chain.node("Multiplier", |a| a * 100);
    chain.assign(adder, 20).unwrap();
    chain
        .pipeline(&[adder, passthru, divider, multiplier])
        .unwrap();
    (chain, [adder, passthru, divider, multiplier])
}

#[test]
fn fresh_node_evaluates_zero() {
    let mut chain: Chain<i64> = Chain::new();
    let id = chain.passthrough("empty");
    assert_eq!(*chain.input(id).unwrap(), 0);
    assert_eq!(*chain.output(id).unwrap(), 0);
    assert_eq!(chain.eval(id).unwrap(), 0);

    let plus = chain.node("plus", |x| x + 5);
    assert_eq!(chain.eval(plus).unwrap(), 5);
}

#[test]
fn reference_wiring_values() {
    let (mut chain, [adder, passthru, divider, multiplier]) = reference();
    assert_eq!(chain.eval(multiplier).unwrap(), 700);
    assert_eq!(chain.eval(divider).unwrap(), 7);
    assert_eq!(chain.eval(passthru).unwrap(), 21);
    assert_eq!(chain.eval(adder).unwrap(), 21);
}

#[test]
fn eval_is_composition_of_transforms() {
    let mut chain: Chain<i64> = Chain::new();
    let f0 = chain.node("f0", |x: i64| x * 2);
    let f1 = chain.node("f1", |x| x - 3);
    let f2 = chain.passthrough("f2");
    let f3 = chain.node("f3", |x| x * x);
    chain.pipeline(&[f0, f1, f2, f3]).unwrap();

    for v in [-4, 0, 1, 9] {
        chain.assign(f0, v).unwrap();
        let expected = (v * 2 - 3) * (v * 2 - 3);
        assert_eq!(chain.eval(f3).unwrap(), expected);
    }
}

#[test]
fn passthrough_forwards_upstream_output() {
    let (mut chain, [_, passthru, _, _]) = reference();
    let head = chain.head_of(passthru).unwrap();
    let upstream_value = chain.eval(head).unwrap();
    assert_eq!(chain.eval(passthru).unwrap(), upstream_value);
    assert!(chain.get(passthru).unwrap().is_passthrough());
}

#[test]
fn repeated_eval_is_deterministic() {
    let (mut chain, [.., multiplier]) = reference();
    let first = chain.eval(multiplier).unwrap();
    let second = chain.eval(multiplier).unwrap();
    assert_eq!(first, second);
}

#[test]
fn eval_reruns_whole_prefix_without_memoizing() {
    let calls = Rc::new(Cell::new(0));
    let mut chain = Chain::new();
    let head = chain.node("head", counted(&calls, |x| x + 1));
    let tail = chain.node("tail", |x: i64| x * 10);
    chain.link(tail, head).unwrap();

    chain.eval(tail).unwrap();
    chain.eval(tail).unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn intermediate_eval_leaves_downstream_untouched() {
    let calls = Rc::new(Cell::new(0));
    let mut chain = Chain::new();
    let adder = chain.node("Adder", |a: i64| a + 1);
    let divider = chain.node("Divider", |x| x / 3);
    let multiplier = chain.node("Multiplier", counted(&calls, |a| a * 100));
    chain.pipeline(&[adder, divider, multiplier]).unwrap();
    chain.assign(adder, 20).unwrap();

    assert_eq!(chain.eval(divider).unwrap(), 7);
    assert_eq!(calls.get(), 0);
    assert_eq!(*chain.input(multiplier).unwrap(), 0);
    assert_eq!(*chain.output(multiplier).unwrap(), 0);
}

#[test]
fn upstream_overwrites_assigned_input() {
    let (mut chain, [_, passthru, ..]) = reference();
    chain.assign(passthru, 999).unwrap();
    assert_eq!(chain.eval(passthru).unwrap(), 21);
    assert_eq!(*chain.input(passthru).unwrap(), 21);
}

#[test]
fn run_does_not_follow_upstream() {
    let (mut chain, [_, _, divider, _]) = reference();
    chain.assign(divider, 30).unwrap();
    chain.run(divider).unwrap();
    assert_eq!(*chain.output(divider).unwrap(), 10);
}

#[test]
fn relinking_replaces_previous_upstream() {
    let mut chain = Chain::new();
    let a = chain.node("a", |_: i64| 1);
    let b = chain.node("b", |_| 2);
    let c = chain.passthrough("c");

    chain.link(c, a).unwrap();
    assert_eq!(chain.eval(c).unwrap(), 1);
    chain.link(c, b).unwrap();
    assert_eq!(chain.upstream(c).unwrap(), Some(b));
    assert_eq!(chain.eval(c).unwrap(), 2);

    assert_eq!(chain.unlink(c).unwrap(), Some(b));
    assert_eq!(chain.head_of(c).unwrap(), c);
}

#[test]
fn depth_and_head() {
    let (chain, [adder, passthru, divider, multiplier]) = reference();
    assert_eq!(chain.depth(adder).unwrap(), 0);
    assert_eq!(chain.depth(passthru).unwrap(), 1);
    assert_eq!(chain.depth(multiplier).unwrap(), 3);
    assert_eq!(chain.head_of(divider).unwrap(), adder);
    assert_eq!(chain.len(), 4);
    assert_eq!(chain.ids().count(), 4);
}

// Cycles are rejected at link time; evaluation never sees one.
#[test]
fn self_link_is_rejected() {
    let mut chain: Chain<i64> = Chain::new();
    let a = chain.passthrough("a");
    assert_eq!(chain.link(a, a), Err(ChainError::SelfLink("a".to_string())));
    assert_eq!(chain.upstream(a).unwrap(), None);
}

#[test]
fn transitive_cycle_is_rejected_and_chain_unchanged() {
    let (mut chain, [adder, _, _, multiplier]) = reference();
    let err = chain.link(adder, multiplier).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cycle detected: Adder -> Multiplier -> Divider -> Passthru -> Adder"
    );
    assert_eq!(chain.upstream(adder).unwrap(), None);
    assert_eq!(chain.eval(multiplier).unwrap(), 700);
}

#[test]
fn foreign_id_is_unknown() {
    let mut small: Chain<i64> = Chain::new();
    small.passthrough("only");
    let (_, [.., multiplier]) = reference();
    assert_eq!(small.eval(multiplier), Err(ChainError::UnknownNode(multiplier)));
}

#[test]
fn works_with_non_numeric_payloads() {
    let mut chain: Chain<String> = Chain::new();
    let head = chain.node("greet", |s| format!("hello {s}"));
    let shout = chain.node("shout", |s: String| s.to_uppercase());
    chain.link(shout, head).unwrap();
    chain.assign(head, "nomad".to_string()).unwrap();
    assert_eq!(chain.eval(shout).unwrap(), "HELLO NOMAD");
}

#[test]
fn swapping_a_transform_changes_downstream_results() {
    let (mut chain, [_, passthru, divider, multiplier]) = reference();
    assert_eq!(chain.eval(multiplier).unwrap(), 700);

    chain.set_transform(passthru, Some(Box::new(|x: i64| x * 3))).unwrap();
    assert!(!chain.get(passthru).unwrap().is_passthrough());
    assert_eq!(chain.eval(multiplier).unwrap(), 2_100);

    chain.set_transform(divider, None).unwrap();
    assert!(chain.get(divider).unwrap().is_passthrough());
    assert_eq!(chain.eval(multiplier).unwrap(), 6_300);
}

#[test]
fn set_transform_does_not_recompute_until_eval() {
    let (mut chain, [.., multiplier]) = reference();
    chain.eval(multiplier).unwrap();
    chain.set_transform(multiplier, None).unwrap();
    assert_eq!(*chain.output(multiplier).unwrap(), 700);
    assert_eq!(chain.eval(multiplier).unwrap(), 7);
}

#[test]
fn link_many_is_all_or_nothing() {
    let mut chain: Chain<i64> = Chain::new();
    let a = chain.passthrough("a");
    let b = chain.passthrough("b");
    let c = chain.passthrough("c");
    chain.link(b, a).unwrap();

    let err = chain.link_many(&[(c, b), (a, c)]).unwrap_err();
    assert_eq!(err.to_string(), "cycle detected: a -> c -> b -> a");
    assert_eq!(chain.upstream(a).unwrap(), None);
    assert_eq!(chain.upstream(b).unwrap(), Some(a));
    assert_eq!(chain.upstream(c).unwrap(), None);

    assert_eq!(
        chain.link_many(&[(c, b), (c, c)]),
        Err(ChainError::SelfLink("c".to_string()))
    );
    assert_eq!(chain.upstream(c).unwrap(), None);

    chain.link_many(&[(c, b)]).unwrap();
    assert_eq!(chain.head_of(c).unwrap(), a);
}

#[test]
fn long_pipeline_links_in_linear_time() {
    let n = 200_000;
    let mut chain: Chain<i64> = Chain::new();
    let ids: Vec<NodeId> = (0..n).map(|i| chain.passthrough(format!("n{i}"))).collect();

    let started = Instant::now();
    chain.pipeline(&ids).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(chain.depth(ids[n - 1]).unwrap(), n - 1);
    assert!(elapsed < Duration::from_secs(5), "took {:?}", elapsed);

    let err = chain.link(ids[0], ids[n - 1]).unwrap_err();
    assert!(matches!(err, ChainError::Cycle { ref path } if path.len() == n + 1));
}

//! # Well-Formedness Analysis
//!
//! A static pass over the parser graph, run once per grammar before any
//! parse. It computes which parsers are *nullable* (can succeed without
//! consuming input) by monotonic fix-point, then checks two properties
//! that would make parsing diverge:
//!
//! 1. **Left recursion**: a cycle in the left-edge graph, the edges a
//!    parser may follow before consuming any input. Rejected unless every
//!    parser on the cycle opts into explicit left-recursion handling.
//! 2. **Nullable repetition**: an unbounded repetition (or operator-fold
//!    step) whose body is nullable, which would iterate forever.
//!
//! Structure is read from [`Shape`]; the pass never needs the concrete
//! parser types and works for user-defined parsers out of the box.

use hashbrown::{HashMap, HashSet};

use crate::error::GrammarError;
use crate::parser::{parser_addr, ParserRef, Shape};

struct Node {
    parser: ParserRef,
    children: Vec<usize>,
    shape: Shape,
}

/// Check the graph reachable from `root`. An empty result means the
/// grammar is well-formed; the driver refuses to parse otherwise.
#[must_use]
pub fn check_well_formed(root: &ParserRef) -> Vec<GrammarError> {
    let nodes = collect(root);
    let nullable = nullable_fixpoint(&nodes);
    let mut faults = Vec::new();
    detect_left_recursion(&nodes, &nullable, &mut faults);
    detect_nullable_repetition(&nodes, &nullable, &mut faults);
    faults
}

fn collect(root: &ParserRef) -> Vec<Node> {
    let mut index: HashMap<usize, usize, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    let mut nodes = Vec::new();
    let mut work = vec![root.clone()];
    while let Some(parser) = work.pop() {
        let addr = parser_addr(&parser);
        if index.contains_key(&addr) {
            continue;
        }
        index.insert(addr, nodes.len());
        work.extend(parser.children());
        let shape = parser.shape();
        nodes.push(Node {
            parser,
            children: Vec::new(),
            shape,
        });
    }
    for i in 0..nodes.len() {
        let children: Vec<usize> = nodes[i]
            .parser
            .children()
            .iter()
            .map(|c| index[&parser_addr(c)])
            .collect();
        nodes[i].children = children;
    }
    nodes
}

fn nullable_fixpoint(nodes: &[Node]) -> Vec<bool> {
    let mut nullable = vec![false; nodes.len()];
    loop {
        let mut changed = false;
        for (i, node) in nodes.iter().enumerate() {
            if nullable[i] {
                continue;
            }
            let value = match node.shape {
                Shape::Terminal { nullable: declared } | Shape::Opaque { nullable: declared } => {
                    declared
                }
                Shape::Sequence => node.children.iter().all(|&c| nullable[c]),
                Shape::Choice => node.children.iter().any(|&c| nullable[c]),
                Shape::Optional | Shape::Lookahead => true,
                Shape::Repeat { min, .. } => {
                    min == 0 || node.children.first().is_some_and(|&c| nullable[c])
                }
                Shape::Bridge | Shape::Fold => {
                    node.children.first().is_some_and(|&c| nullable[c])
                }
            };
            if value {
                nullable[i] = true;
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

/// Successors a parser may invoke before consuming any input.
fn left_edges(node: &Node, nullable: &[bool]) -> Vec<usize> {
    match node.shape {
        Shape::Terminal { .. } | Shape::Opaque { .. } => Vec::new(),
        Shape::Choice | Shape::Optional | Shape::Lookahead | Shape::Bridge => {
            node.children.clone()
        }
        Shape::Repeat { .. } => node.children.clone(),
        Shape::Sequence => {
            let mut edges = Vec::new();
            for &child in &node.children {
                edges.push(child);
                if !nullable[child] {
                    break;
                }
            }
            edges
        }
        Shape::Fold => {
            let mut edges = Vec::new();
            if let Some((&operand, branches)) = node.children.split_first() {
                edges.push(operand);
                if nullable[operand] {
                    edges.extend(branches.iter().copied());
                }
            }
            edges
        }
    }
}

fn detect_left_recursion(nodes: &[Node], nullable: &[bool], faults: &mut Vec<GrammarError>) {
    let edges: Vec<Vec<usize>> = nodes.iter().map(|n| left_edges(n, nullable)).collect();

    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    fn visit(
        i: usize,
        nodes: &[Node],
        edges: &[Vec<usize>],
        color: &mut [Color],
        path: &mut Vec<usize>,
        seen: &mut HashSet<Vec<usize>, ahash::RandomState>,
        faults: &mut Vec<GrammarError>,
    ) {
        color[i] = Color::Gray;
        path.push(i);
        for &j in &edges[i] {
            match color[j] {
                Color::White => visit(j, nodes, edges, color, path, seen, faults),
                Color::Gray => {
                    let start = path.iter().position(|&k| k == j).unwrap_or(0);
                    let cycle = &path[start..];
                    let mut key = cycle.to_vec();
                    key.sort_unstable();
                    if !seen.insert(key) {
                        continue;
                    }
                    if cycle
                        .iter()
                        .all(|&k| nodes[k].parser.handles_left_recursion())
                    {
                        continue;
                    }
                    let mut names: Vec<String> =
                        cycle.iter().map(|&k| nodes[k].parser.display_name()).collect();
                    names.push(nodes[j].parser.display_name());
                    faults.push(GrammarError::LeftRecursion { cycle: names });
                }
                Color::Black => {}
            }
        }
        path.pop();
        color[i] = Color::Black;
    }

    let mut color = vec![Color::White; nodes.len()];
    let mut path = Vec::new();
    let mut seen = HashSet::with_hasher(ahash::RandomState::new());
    for i in 0..nodes.len() {
        if color[i] == Color::White {
            visit(i, nodes, &edges, &mut color, &mut path, &mut seen, faults);
        }
    }
}

fn detect_nullable_repetition(nodes: &[Node], nullable: &[bool], faults: &mut Vec<GrammarError>) {
    for node in nodes {
        match node.shape {
            Shape::Repeat { bounded: false, .. } => {
                if node.children.first().is_some_and(|&body| nullable[body]) {
                    faults.push(GrammarError::NullableRepetition {
                        parser: node.parser.display_name(),
                    });
                }
            }
            // A nullable fold step loops exactly like a nullable repeat body.
            Shape::Fold => {
                if node.children[1..].iter().any(|&branch| nullable[branch]) {
                    faults.push(GrammarError::NullableRepetition {
                        parser: node.parser.display_name(),
                    });
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::OnceCell;
    use std::rc::{Rc, Weak};

    use super::*;
    use crate::combinators::{choice, lit, optional, recursive, repeat, seq, star};
    use crate::error::ParseError;
    use crate::parser::Parser;
    use crate::state::ParseState;

    #[test]
    fn direct_left_recursion_is_rejected() {
        // A := A | 'x'
        let a = recursive(|a| choice([a, lit('x')]));
        let faults = check_well_formed(&a);
        assert!(matches!(faults[0], GrammarError::LeftRecursion { .. }));
    }

    #[test]
    fn right_recursion_is_accepted() {
        // A := 'x' A | 'x'
        let a = recursive(|a| choice([seq([lit('x'), a]), lit('x')]));
        assert!(check_well_formed(&a).is_empty());
    }

    #[test]
    fn indirect_left_recursion_is_rejected() {
        // A := B 'a', B := A | 'b'
        let a = recursive(|a| seq([choice([a, lit('b')]), lit('a')]));
        let faults = check_well_formed(&a);
        assert_eq!(faults.len(), 1);
    }

    #[test]
    fn left_recursion_through_nullable_prefix_is_rejected() {
        // A := 'x'? A: the optional prefix keeps A on its own left edge.
        let a = recursive(|a| seq([optional(lit('x')), a]));
        let faults = check_well_formed(&a);
        assert!(matches!(faults[0], GrammarError::LeftRecursion { .. }));
    }

    #[test]
    fn nullable_repetition_is_rejected() {
        let parser = star(optional(lit('a')));
        let faults = check_well_formed(&parser);
        assert!(matches!(faults[0], GrammarError::NullableRepetition { .. }));
    }

    #[test]
    fn bounded_repetition_over_nullable_body_is_fine() {
        let parser = repeat(optional(lit('a')), 0, Some(4));
        assert!(check_well_formed(&parser).is_empty());
    }

    #[test]
    fn plain_star_is_fine() {
        assert!(check_well_formed(&star(lit('a'))).is_empty());
    }

    /// A self-referential parser that claims to handle left recursion.
    struct SelfLoop {
        this: OnceCell<Weak<dyn Parser>>,
        handles: bool,
    }

    impl Parser for SelfLoop {
        fn doparse(&self, _state: &mut ParseState) -> Result<bool, ParseError> {
            Ok(false)
        }

        fn children(&self) -> Vec<ParserRef> {
            self.this
                .get()
                .and_then(Weak::upgrade)
                .map_or_else(Vec::new, |p| vec![p])
        }

        fn kind_name(&self) -> &'static str {
            "self_loop"
        }

        fn shape(&self) -> Shape {
            Shape::Bridge
        }

        fn handles_left_recursion(&self) -> bool {
            self.handles
        }
    }

    fn self_loop(handles: bool) -> ParserRef {
        let node = Rc::new(SelfLoop {
            this: OnceCell::new(),
            handles,
        });
        let parser: ParserRef = node.clone();
        let _ = node.this.set(Rc::downgrade(&parser));
        parser
    }

    #[test]
    fn marked_cycles_are_accepted() {
        assert!(check_well_formed(&self_loop(true)).is_empty());
        let faults = check_well_formed(&self_loop(false));
        assert!(matches!(faults[0], GrammarError::LeftRecursion { .. }));
    }
}

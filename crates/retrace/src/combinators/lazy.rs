//! # Lazy & Recursive Bridges
//!
//! Non-bridge edges of a parser graph must form a DAG; these two nodes
//! are the only way a parser may reference itself or a parser defined
//! later. Both resolve their target exactly once and delegate everything
//! to it afterwards.
//!
//! - [`Lazy`] defers construction: the factory runs on first use and the
//!   bridge *owns* the resolved target. Safe for forward references,
//!   whose targets cannot contain the bridge itself.
//! - [`Recursive`] closes a cycle: it holds a *weak* reference to a body
//!   that contains it, so the ownership graph stays acyclic. The body is
//!   the owner: keep it (or a grammar that registered it) alive for the
//!   duration of the parse.

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::ParseError;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::ParseState;

pub(crate) struct Lazy {
    pub(crate) factory: RefCell<Option<Box<dyn Fn() -> ParserRef>>>,
    pub(crate) target: OnceCell<ParserRef>,
}

impl Lazy {
    fn target(&self) -> Option<ParserRef> {
        if let Some(target) = self.target.get() {
            return Some(target.clone());
        }
        let factory = self.factory.borrow_mut().take()?;
        let resolved = factory();
        let _ = self.target.set(resolved);
        self.target.get().cloned()
    }
}

impl Parser for Lazy {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let target = self.target().ok_or_else(|| {
            ParseError::internal(
                self.display_name(),
                "factory re-entered before its target resolved; use `recursive` for self-reference",
            )
        })?;
        target.parse(state)
    }

    fn children(&self) -> Vec<ParserRef> {
        self.target().map_or_else(Vec::new, |target| vec![target])
    }

    fn kind_name(&self) -> &'static str {
        "lazy"
    }

    fn shape(&self) -> Shape {
        Shape::Bridge
    }
}

pub(crate) struct Recursive {
    pub(crate) target: OnceCell<Weak<dyn Parser>>,
}

impl Recursive {
    fn resolved(&self) -> Option<ParserRef> {
        self.target.get().and_then(Weak::upgrade)
    }
}

impl Parser for Recursive {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let target = self.resolved().ok_or_else(|| {
            ParseError::internal(
                self.display_name(),
                "recursion bridge unresolved or its target was dropped",
            )
        })?;
        target.parse(state)
    }

    fn children(&self) -> Vec<ParserRef> {
        self.resolved().map_or_else(Vec::new, |target| vec![target])
    }

    fn kind_name(&self) -> &'static str {
        "recursive"
    }

    fn shape(&self) -> Shape {
        Shape::Bridge
    }
}

/// Tie a recursive knot: `build` receives a bridge standing for the
/// parser being defined and returns the body; the bridge then resolves
/// to that body.
///
/// ```
/// use retrace::combinators::{choice, recursive, seq, string};
/// use retrace::{parse_text, ParseOptions};
///
/// // R := "ab" R | "ab"
/// let r = recursive(|r| choice([seq([string("ab"), r]), string("ab")]));
/// assert!(parse_text(&r, "ababab", ParseOptions::default())
///     .unwrap()
///     .is_success());
/// ```
pub fn recursive(build: impl FnOnce(ParserRef) -> ParserRef) -> ParserRef {
    let bridge = Rc::new(Recursive {
        target: OnceCell::new(),
    });
    let handle: ParserRef = bridge.clone();
    let body = build(handle);
    let _ = bridge.target.set(Rc::downgrade(&body));
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{choice, lazy, lit, seq};
    use crate::input::Source;

    #[test]
    fn lazy_resolves_once() {
        let target = lit('a');
        let inner = target.clone();
        let bridged = lazy(move || inner.clone());
        let mut state = ParseState::new(Source::text("a"));
        assert!(bridged.parse(&mut state).unwrap());
        assert_eq!(state.pos(), 1);
        assert_eq!(bridged.children().len(), 1);
    }

    #[test]
    fn recursive_parses_nested_input() {
        // P := '(' P ')' | 'x'
        let p = recursive(|p| choice([seq([lit('('), p, lit(')')]), lit('x')]));
        let mut state = ParseState::new(Source::text("((x))"));
        assert!(p.parse(&mut state).unwrap());
        assert_eq!(state.pos(), 5);
    }

    #[test]
    fn dropped_target_is_a_fatal_error() {
        let bridge = Rc::new(Recursive {
            target: OnceCell::new(),
        });
        let handle: ParserRef = bridge.clone();
        {
            let body = lit('a');
            let _ = bridge.target.set(Rc::downgrade(&body));
        }
        let mut state = ParseState::new(Source::text("a"));
        assert!(handle.parse(&mut state).is_err());
    }
}

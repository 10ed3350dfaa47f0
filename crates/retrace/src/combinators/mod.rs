//! # Combinator Library
//!
//! Construction factories for the built-in parsers. Every factory returns
//! a [`ParserRef`], so graphs compose by value:
//!
//! ```
//! use retrace::combinators::{char_pred, choice, lit, plus, seq, string};
//! use retrace::{parse_text, ParseOptions};
//!
//! let ident = seq([
//!     char_pred("letter", |c| c.is_ascii_alphabetic()),
//!     plus(char_pred("alnum", |c| c.is_ascii_alphanumeric())),
//! ]);
//! let item = choice([ident, string("_")]);
//! assert!(parse_text(&item, "x2", ParseOptions::default())
//!     .unwrap()
//!     .is_success());
//! # let _ = lit('x');
//! ```
//!
//! Primitives (`lit`, `string`, `char_pred`, `any_char`, `object_pred`)
//! are furthest-error leaves. `seq` runs children in order; `choice` is
//! PEG ordered choice; `repeat`/`star`/`plus` are greedy; `optional`
//! never fails; `lookahead`/`not` match without consuming. `lazy` and
//! [`recursive`] are the only bridges through which the graph may be
//! cyclic. `collect` and the operator folds build AST values through the
//! journal, so everything they push unwinds on backtrack.

mod choice;
mod collect;
mod fold;
mod lazy;
mod lookahead;
mod primitive;
mod repeat;
mod rule;
mod seq;

pub use collect::BuildAction;
pub use fold::FoldBranch;
pub use lazy::recursive;

use std::any::Any;
use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use crate::input::Span;
use crate::parser::ParserRef;
use crate::state::{AstValue, ParseState};

/// Match one exact character.
#[must_use]
pub fn lit(expected: char) -> ParserRef {
    Rc::new(primitive::CharLit { expected })
}

/// Match an exact character sequence.
#[must_use]
pub fn string(expected: &str) -> ParserRef {
    Rc::new(primitive::StrLit {
        expected: expected.chars().collect(),
        rendered: expected.to_string(),
    })
}

/// Match one character satisfying `pred`. The name is used in
/// diagnostics ("digit", "letter", ...).
#[must_use]
pub fn char_pred(name: impl Into<String>, pred: impl Fn(char) -> bool + 'static) -> ParserRef {
    Rc::new(primitive::CharPred {
        name: name.into(),
        pred: Box::new(pred),
    })
}

/// Match any single character.
#[must_use]
pub fn any_char() -> ParserRef {
    Rc::new(primitive::AnyChar)
}

/// Match one token satisfying `pred` (object-mode input only).
#[must_use]
pub fn object_pred(
    name: impl Into<String>,
    pred: impl Fn(&dyn Any) -> bool + 'static,
) -> ParserRef {
    Rc::new(primitive::ObjectPred {
        name: name.into(),
        pred: Box::new(pred),
    })
}

/// Run `children` in order; succeed iff all succeed.
#[must_use]
pub fn seq(children: impl IntoIterator<Item = ParserRef>) -> ParserRef {
    Rc::new(seq::Sequence {
        children: children.into_iter().collect(),
    })
}

/// Ordered choice: first success wins and is never revisited.
#[must_use]
pub fn choice(children: impl IntoIterator<Item = ParserRef>) -> ParserRef {
    Rc::new(choice::Choice {
        children: children.into_iter().collect(),
    })
}

/// Greedy repetition of `child`, between `min` and `max` times
/// (`None` = unbounded).
#[must_use]
pub fn repeat(child: ParserRef, min: usize, max: Option<usize>) -> ParserRef {
    Rc::new(repeat::Repeat { child, min, max })
}

/// Zero or more.
#[must_use]
pub fn star(child: ParserRef) -> ParserRef {
    repeat(child, 0, None)
}

/// One or more.
#[must_use]
pub fn plus(child: ParserRef) -> ParserRef {
    repeat(child, 1, None)
}

/// Run `child`; succeed whether or not it matched.
#[must_use]
pub fn optional(child: ParserRef) -> ParserRef {
    Rc::new(repeat::Optional { child })
}

/// Succeed iff `child` matches here, consuming nothing.
#[must_use]
pub fn lookahead(child: ParserRef) -> ParserRef {
    Rc::new(lookahead::Lookahead { child })
}

/// Succeed iff `child` does *not* match here, consuming nothing.
#[must_use]
pub fn not(child: ParserRef) -> ParserRef {
    Rc::new(lookahead::Not { child })
}

/// Defer construction: `factory` runs on first use and its result is
/// memoized. For self-recursive definitions use [`recursive`].
#[must_use]
pub fn lazy(factory: impl Fn() -> ParserRef + 'static) -> ParserRef {
    Rc::new(lazy::Lazy {
        factory: RefCell::new(Some(Box::new(factory))),
        target: OnceCell::new(),
    })
}

/// Give `child` a display name for diagnostics.
#[must_use]
pub fn named(name: impl Into<String>, child: ParserRef) -> ParserRef {
    Rc::new(rule::Named {
        name: name.into(),
        child,
    })
}

/// After `child` succeeds, replace the AST frame it pushed with the value
/// computed by `action`.
#[must_use]
pub fn collect(
    child: ParserRef,
    action: impl Fn(&ParseState, Span, &[AstValue]) -> AstValue + 'static,
) -> ParserRef {
    collect_lookback(child, 0, action)
}

/// Like [`collect`], additionally consuming the `lookback` values
/// immediately below the frame.
#[must_use]
pub fn collect_lookback(
    child: ParserRef,
    lookback: usize,
    action: impl Fn(&ParseState, Span, &[AstValue]) -> AstValue + 'static,
) -> ParserRef {
    Rc::new(collect::Collect {
        child,
        lookback,
        action: Rc::new(action),
    })
}

/// Left-associative operator fold: parse `operand`, then loop over the
/// `branches` in order, reducing the frame after each match.
#[must_use]
pub fn left_fold(operand: ParserRef, branches: impl IntoIterator<Item = FoldBranch>) -> ParserRef {
    Rc::new(fold::LeftFold {
        operand,
        branches: branches.into_iter().collect(),
    })
}

/// Right-associative operator fold: like [`left_fold`] but recurses into
/// the right-hand side before reducing.
#[must_use]
pub fn right_fold(operand: ParserRef, branches: impl IntoIterator<Item = FoldBranch>) -> ParserRef {
    Rc::new(fold::RightFold {
        operand,
        branches: branches.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParserExt;
    use crate::input::Source;

    fn accepts(parser: &ParserRef, input: &str) -> (bool, usize) {
        let mut state = ParseState::new(Source::text(input));
        let ok = parser.parse(&mut state).unwrap();
        (ok, state.pos())
    }

    #[test]
    fn greedy_repetition_never_leaves_one_behind() {
        // a* consumes every 'a'; the trailing lit can never match.
        let parser = seq([star(lit('a')), lit('a')]);
        for input in ["", "a", "aa", "aaaa"] {
            assert!(!accepts(&parser, input).0, "input {input:?}");
        }
    }

    #[test]
    fn repetition_bounds() {
        let parser = repeat(lit('a'), 2, Some(3));
        assert_eq!(accepts(&parser, "a"), (false, 0));
        assert_eq!(accepts(&parser, "aa"), (true, 2));
        assert_eq!(accepts(&parser, "aaaa"), (true, 3));
    }

    #[test]
    fn prefix_capture_depends_on_choice_order() {
        let short_first = seq([choice([string("a"), string("aa")]), string("b")]);
        let long_first = seq([choice([string("aa"), string("a")]), string("b")]);
        assert!(!accepts(&short_first, "aab").0);
        assert_eq!(accepts(&long_first, "aab"), (true, 3));
    }

    #[test]
    fn lookahead_consumes_nothing() {
        let parser = seq([lookahead(string("ab")), string("abc")]);
        assert_eq!(accepts(&parser, "abc"), (true, 3));

        let guard = seq([not(string("ab")), string("ac")]);
        assert_eq!(accepts(&guard, "ac"), (true, 2));
        assert!(!accepts(&guard, "ab").0);
    }

    #[test]
    fn optional_never_fails() {
        let parser = seq([optional(lit('-')), lit('1')]);
        assert_eq!(accepts(&parser, "-1"), (true, 2));
        assert_eq!(accepts(&parser, "1"), (true, 1));
    }

    #[test]
    fn object_predicates_match_token_input() {
        use std::rc::Rc;
        let parser = seq([
            object_pred("number", |item| item.downcast_ref::<u32>().is_some()),
            object_pred("text", |item| item.downcast_ref::<&str>().is_some()),
        ]);
        let source = Source::objects(vec![Rc::new(7u32), Rc::new("seven")]);
        let mut state = ParseState::new(source);
        assert!(parser.parse(&mut state).unwrap());
        assert_eq!(state.pos(), 2);
    }

    #[test]
    fn char_primitive_on_object_input_is_fatal() {
        let parser = lit('a');
        let mut state = ParseState::new(Source::objects(vec![]));
        assert!(parser.parse(&mut state).is_err());
    }
}

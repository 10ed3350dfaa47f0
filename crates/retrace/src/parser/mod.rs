//! # Parser Contract
//!
//! Every parser node implements [`Parser`]: a `doparse` method with the
//! raw matching logic, plus structural metadata (`children`, `shape`,
//! names) consumed by graph walks and the well-formedness analysis.
//!
//! Nobody calls `doparse` directly. The executor ([`ParserExt::parse`],
//! written once and not overridable) wraps every invocation in a
//! snapshot, commits on success, and on failure rolls the state back and
//! records furthest-error information for terminal parsers. This is what
//! guarantees the single-parse rule: after `parse`, the state is either
//! strictly advanced with effects retained, or exactly restored.
//!
//! Parser graphs are built once, then immutable. Nodes are shared through
//! [`ParserRef`] and edges are defined by `children()`; cycles are only
//! permitted through the recursion bridge (see
//! [`crate::combinators::recursive`]).

use std::rc::Rc;

use crate::error::ParseError;
use crate::state::ParseState;

/// A shared parser node.
pub type ParserRef = Rc<dyn Parser>;

/// Structural description of a parser node, consumed by the
/// well-formedness analysis to derive nullability and left edges without
/// knowing the concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Matches a fixed amount of input; `nullable` is true only for
    /// degenerate cases like the empty string literal.
    Terminal { nullable: bool },
    /// Runs all children in order; nullable iff all children are.
    Sequence,
    /// Ordered choice; nullable iff any child is.
    Choice,
    /// Always succeeds; always nullable.
    Optional,
    /// Greedy repetition of the single child.
    Repeat { min: usize, bounded: bool },
    /// Positive or negative lookahead; always nullable, never consumes.
    Lookahead,
    /// Delegates to a single child (lazy/recursive bridges, named rules,
    /// memo wrappers); nullable iff the child is.
    Bridge,
    /// Operator fold: `children()[0]` is the operand, the rest are the
    /// branch parsers, looped after the operand.
    Fold,
    /// Anything else; nullability as declared, no left edges assumed.
    Opaque { nullable: bool },
}

/// The contract all parser nodes implement.
///
/// Implementations provide `doparse`; callers go through
/// [`ParserExt::parse`]. On `true`, `doparse` must leave the position at
/// or after where it started and must have logged every mutation through
/// the journal; on `false` it may leave the state dirty, and the
/// executor rolls it back.
pub trait Parser: 'static {
    /// The raw matching logic. Only the executor calls this.
    ///
    /// # Errors
    ///
    /// Fatal faults only ([`ParseError`]); a plain mismatch is `Ok(false)`.
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError>;

    /// All sub-parsers referenced by this node.
    fn children(&self) -> Vec<ParserRef> {
        Vec::new()
    }

    /// Optional display name assigned by the grammar author.
    fn rule_name(&self) -> Option<&str> {
        None
    }

    /// The combinator kind, used as a display fallback.
    fn kind_name(&self) -> &'static str;

    /// Structural description for the well-formedness analysis.
    fn shape(&self) -> Shape {
        Shape::Opaque { nullable: false }
    }

    /// Whether this parser is a leaf for furthest-error purposes: it
    /// matches input directly rather than delegating to sub-parsers.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Whether this parser explicitly handles left recursion. Cycles in
    /// the left-edge graph are rejected unless every node on the cycle
    /// opts in.
    fn handles_left_recursion(&self) -> bool {
        false
    }

    /// Human-readable name: the rule name if assigned, a combinator
    /// rendering otherwise.
    fn display_name(&self) -> String {
        self.rule_name()
            .map_or_else(|| self.kind_name().to_string(), str::to_string)
    }
}

/// Identity of a parser node, used to key memoizers and analysis maps.
#[must_use]
pub(crate) fn parser_addr(parser: &ParserRef) -> usize {
    Rc::as_ptr(parser) as *const () as usize
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::ParserRef {}
}

/// The executor. Implemented once for [`ParserRef`] and sealed: the
/// snapshot/commit/rollback discipline cannot be overridden.
pub trait ParserExt: sealed::Sealed {
    /// Run the parser transactionally.
    ///
    /// On success the state keeps every applied effect and the advanced
    /// position. On failure the state is restored to its pre-call value
    /// and, if the parser is a terminal, the failure position feeds
    /// furthest-error tracking.
    ///
    /// # Errors
    ///
    /// Propagates fatal faults from `doparse`, and raises
    /// [`ParseError::InternalInvariant`] if a parser claims success while
    /// moving the position backwards.
    fn parse(&self, state: &mut ParseState) -> Result<bool, ParseError>;
}

impl ParserExt for ParserRef {
    fn parse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let snapshot = state.snapshot();
        let start = snapshot.pos();
        if self.doparse(state)? {
            if state.pos() < start {
                return Err(ParseError::internal(
                    self.display_name(),
                    format!(
                        "succeeded but moved the position backwards ({} -> {})",
                        start,
                        state.pos()
                    ),
                ));
            }
            state.commit(snapshot);
            Ok(true)
        } else {
            state.rollback(snapshot)?;
            if self.is_terminal() {
                state.record_error(self, start);
            }
            Ok(false)
        }
    }
}

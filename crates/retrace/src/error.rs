//! # Error Types
//!
//! Fatal errors raised by the parsing engine.
//!
//! A plain failure to match is *not* an error: parsers signal it by
//! returning `false` and the executor restores the parse state (see
//! [`crate::parser::ParserExt::parse`]). Everything in this module is a
//! programming or configuration mistake that aborts the parse:
//!
//! - [`GrammarError`]: the grammar graph is ill-formed (left recursion,
//!   repetition over a nullable parser)
//! - [`ParseError`]: runtime faults (wrong input mode, memoizer
//!   inconsistency, violated engine invariants)
//!
//! When the `diagnostics` feature is enabled, errors integrate with
//! [`miette`] for rich reporting.

use thiserror::Error;

use crate::input::SourceKind;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// A defect found in the parser graph by the well-formedness analysis.
///
/// Any of these makes the grammar unrunnable: the driver refuses to parse
/// until the graph is fixed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    /// A cycle in the left-edge graph: the parsers on the cycle can call
    /// each other before consuming any input, which recurses forever.
    #[error("left-recursive cycle: {}", cycle.join(" -> "))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(retrace::left_recursion)))]
    LeftRecursion { cycle: Vec<String> },

    /// An unbounded repetition whose body can succeed without consuming
    /// input, which iterates forever.
    #[error("unbounded repetition over nullable parser: {parser}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(retrace::nullable_repetition)))]
    NullableRepetition { parser: String },
}

/// A fatal fault raised during parsing.
///
/// Match failures never surface here; they propagate as `false` returns
/// and feed furthest-error tracking instead.
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// The grammar failed the well-formedness analysis; parsing refused.
    #[error("grammar is ill-formed ({} defect(s))", .0.len())]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(retrace::ill_formed)))]
    IllFormed(Vec<GrammarError>),

    /// A character primitive ran against token input, or vice versa.
    #[error("{parser} requires {expected} input")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(retrace::wrong_input_mode)))]
    WrongInputMode {
        parser: String,
        expected: SourceKind,
    },

    /// A memoizer produced an entry that does not fit the current state.
    #[error("memoizer replay for {parser}: entry starts at {entry_pos}, parse is at {pos}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(retrace::memoizer_inconsistency)))]
    MemoizerInconsistency {
        parser: String,
        entry_pos: usize,
        pos: usize,
    },

    /// An engine invariant was violated (a parser moved the position
    /// backwards, a rollback found a truncated journal, a recursion
    /// bridge was never resolved).
    #[error("internal invariant violated in {parser}: {detail}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(retrace::internal_invariant)))]
    InternalInvariant { parser: String, detail: String },
}

impl ParseError {
    pub(crate) fn internal(parser: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InternalInvariant {
            parser: parser.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn wrong_mode(parser: impl Into<String>, expected: SourceKind) -> Self {
        Self::WrongInputMode {
            parser: parser.into(),
            expected,
        }
    }

    /// The grammar defects carried by an [`ParseError::IllFormed`] error,
    /// if that is what this is.
    #[must_use]
    pub fn grammar_faults(&self) -> Option<&[GrammarError]> {
        match self {
            Self::IllFormed(faults) => Some(faults),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_recursion_names_the_cycle() {
        let error = GrammarError::LeftRecursion {
            cycle: vec!["expr".to_string(), "term".to_string(), "expr".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "left-recursive cycle: expr -> term -> expr"
        );
    }

    #[test]
    fn nullable_repetition_names_the_parser() {
        let error = GrammarError::NullableRepetition {
            parser: "repeat".to_string(),
        };
        assert!(error.to_string().contains("repeat"));
    }

    #[test]
    fn wrong_input_mode_message() {
        let error = ParseError::wrong_mode("digit", SourceKind::Text);
        assert_eq!(error.to_string(), "digit requires character input");
    }

    #[test]
    fn ill_formed_exposes_faults() {
        let error = ParseError::IllFormed(vec![GrammarError::NullableRepetition {
            parser: "star".to_string(),
        }]);
        assert_eq!(error.grammar_faults().map(<[_]>::len), Some(1));
        assert!(error.to_string().contains("1 defect"));
    }
}

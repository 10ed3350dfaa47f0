//! # Collect Actions
//!
//! A [`Collect`] wraps a child parser and, after the child succeeds,
//! replaces the *frame* (the AST-stack values pushed since the child
//! began) with a single value computed by a user callback. With a
//! non-zero lookback, the `k` values immediately below the frame are
//! consumed as well. The replacement goes through the journal, so
//! backtracking past the collect restores the original frame.

use std::rc::Rc;

use crate::error::ParseError;
use crate::input::Span;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::{AstValue, ParseState};

/// An AST build callback: receives the parse state (read-only), the input
/// span the sub-parse covered, and the captured frame; returns the value
/// that replaces the frame.
pub type BuildAction = Rc<dyn Fn(&ParseState, Span, &[AstValue]) -> AstValue>;

pub(crate) struct Collect {
    pub(crate) child: ParserRef,
    pub(crate) lookback: usize,
    pub(crate) action: BuildAction,
}

impl Parser for Collect {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let frame = state.stack_len();
        let start = state.pos();
        if !self.child.parse(state)? {
            return Ok(false);
        }
        let from = frame.checked_sub(self.lookback).ok_or_else(|| {
            ParseError::internal(
                self.display_name(),
                format!("lookback {} exceeds stack depth {frame}", self.lookback),
            )
        })?;
        let captured = state.stack()[from..].to_vec();
        let value = (self.action)(state, Span::new(start, state.pos()), &captured);
        state.replace_frame(from, value);
        Ok(true)
    }

    fn children(&self) -> Vec<ParserRef> {
        vec![self.child.clone()]
    }

    fn kind_name(&self) -> &'static str {
        "collect"
    }

    fn shape(&self) -> Shape {
        Shape::Bridge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{char_pred, collect, collect_lookback, plus, seq};
    use crate::input::Source;

    fn number(body: ParserRef) -> ParserRef {
        collect(body, |state, span, _frame| {
            let chars = state.source().as_chars().unwrap();
            let text: String = chars[span.start..span.end].iter().collect();
            Rc::new(text.parse::<i64>().unwrap())
        })
    }

    fn digits() -> ParserRef {
        number(plus(char_pred("digit", |c| c.is_ascii_digit())))
    }

    fn digit() -> ParserRef {
        number(char_pred("digit", |c| c.is_ascii_digit()))
    }

    #[test]
    fn collect_pushes_one_value_for_the_frame() {
        let parser = digits();
        let mut state = ParseState::new(Source::text("421"));
        assert!(parser.parse(&mut state).unwrap());
        assert_eq!(state.stack_len(), 1);
        assert_eq!(state.stack()[0].downcast_ref::<i64>(), Some(&421));
    }

    #[test]
    fn lookback_consumes_values_below_the_frame() {
        // Sum a previously pushed number with a newly parsed one.
        let sum = collect_lookback(digit(), 1, |_, _, frame| {
            let total: i64 = frame
                .iter()
                .map(|v| *v.downcast_ref::<i64>().unwrap())
                .sum();
            Rc::new(total)
        });
        let parser = seq([digit(), sum]);
        let mut state = ParseState::new(Source::text("12"));
        // Two single digits: 1 then 2, folded into 3.
        assert!(parser.parse(&mut state).unwrap());
        assert_eq!(state.stack_len(), 1);
        assert_eq!(state.stack()[0].downcast_ref::<i64>(), Some(&3));
    }

    #[test]
    fn failed_child_leaves_stack_alone() {
        let parser = digits();
        let mut state = ParseState::new(Source::text("x"));
        assert!(!parser.parse(&mut state).unwrap());
        assert_eq!(state.stack_len(), 0);
    }
}

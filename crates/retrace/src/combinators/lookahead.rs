//! Positive and negative lookahead.
//!
//! Both run their child speculatively and always restore the state:
//! lookaheads never consume input and never retain effects.

use crate::error::ParseError;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::ParseState;

pub(crate) struct Lookahead {
    pub(crate) child: ParserRef,
}

impl Parser for Lookahead {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let snapshot = state.snapshot();
        let matched = self.child.parse(state)?;
        if matched {
            state.rollback(snapshot)?;
        }
        Ok(matched)
    }

    fn children(&self) -> Vec<ParserRef> {
        vec![self.child.clone()]
    }

    fn kind_name(&self) -> &'static str {
        "lookahead"
    }

    fn shape(&self) -> Shape {
        Shape::Lookahead
    }
}

pub(crate) struct Not {
    pub(crate) child: ParserRef,
}

impl Parser for Not {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let snapshot = state.snapshot();
        let matched = self.child.parse(state)?;
        if matched {
            state.rollback(snapshot)?;
        }
        Ok(!matched)
    }

    fn children(&self) -> Vec<ParserRef> {
        vec![self.child.clone()]
    }

    fn kind_name(&self) -> &'static str {
        "not"
    }

    fn shape(&self) -> Shape {
        Shape::Lookahead
    }
}

//! Greedy repetition and the optional combinator.

use crate::error::ParseError;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::ParseState;

/// Greedy repetition: runs the child until it fails or `max` is reached,
/// committing each successful iteration. Succeeds iff at least `min`
/// iterations matched. The iteration that fails is rolled back by the
/// executor; everything before it stays.
pub(crate) struct Repeat {
    pub(crate) child: ParserRef,
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
}

impl Parser for Repeat {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let mut count = 0usize;
        while self.max.is_none_or(|max| count < max) {
            let before = state.pos();
            if !self.child.parse(state)? {
                break;
            }
            count += 1;
            // A zero-width match would never terminate the loop.
            if state.pos() == before {
                break;
            }
        }
        Ok(count >= self.min)
    }

    fn children(&self) -> Vec<ParserRef> {
        vec![self.child.clone()]
    }

    fn kind_name(&self) -> &'static str {
        "repeat"
    }

    fn shape(&self) -> Shape {
        Shape::Repeat {
            min: self.min,
            bounded: self.max.is_some(),
        }
    }
}

/// Runs the child and succeeds either way; a failed child leaves the
/// state untouched.
pub(crate) struct Optional {
    pub(crate) child: ParserRef,
}

impl Parser for Optional {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        self.child.parse(state)?;
        Ok(true)
    }

    fn children(&self) -> Vec<ParserRef> {
        vec![self.child.clone()]
    }

    fn kind_name(&self) -> &'static str {
        "optional"
    }

    fn shape(&self) -> Shape {
        Shape::Optional
    }
}

//! Sequencing.

use crate::error::ParseError;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::ParseState;

/// Runs children in order; succeeds iff all succeed. Any child failure
/// fails the whole sequence and the executor restores the state.
pub(crate) struct Sequence {
    pub(crate) children: Vec<ParserRef>,
}

impl Parser for Sequence {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        for child in &self.children {
            if !child.parse(state)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn children(&self) -> Vec<ParserRef> {
        self.children.clone()
    }

    fn kind_name(&self) -> &'static str {
        "seq"
    }

    fn shape(&self) -> Shape {
        Shape::Sequence
    }
}

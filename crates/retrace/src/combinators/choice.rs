//! Ordered choice.

use crate::error::ParseError;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::ParseState;

/// PEG ordered choice: tries children in order and commits to the first
/// success. Alternatives after a success are never revisited, so a
/// shorter alternative can shadow a longer one (prefix capture).
pub(crate) struct Choice {
    pub(crate) children: Vec<ParserRef>,
}

impl Parser for Choice {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        for child in &self.children {
            if child.parse(state)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn children(&self) -> Vec<ParserRef> {
        self.children.clone()
    }

    fn kind_name(&self) -> &'static str {
        "choice"
    }

    fn shape(&self) -> Shape {
        Shape::Choice
    }
}

//! Named rules.

use crate::error::ParseError;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::ParseState;

/// Delegates to a child and gives it a display name for diagnostics and
/// well-formedness reports.
pub(crate) struct Named {
    pub(crate) name: String,
    pub(crate) child: ParserRef,
}

impl Parser for Named {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        self.child.parse(state)
    }

    fn children(&self) -> Vec<ParserRef> {
        vec![self.child.clone()]
    }

    fn rule_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn kind_name(&self) -> &'static str {
        "rule"
    }

    fn shape(&self) -> Shape {
        Shape::Bridge
    }
}

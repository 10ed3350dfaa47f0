//! # Operator Folds
//!
//! Expression builders for binary operators, expressed as ordinary
//! combinators with a small explicit engine. A fold takes an operand
//! parser and an ordered list of [`FoldBranch`]es; each branch pairs a
//! suffix/infix parser (typically operator-plus-right-operand) with a
//! build callback invoked over the AST frame accumulated since the fold
//! began.
//!
//! The left fold loops: after the operand, branches are tried in order
//! and each success reduces the frame to a single value that becomes the
//! new left-hand side. The right fold recurses into itself for the
//! right-hand side before reducing, yielding right-leaning trees.

use std::rc::Rc;

use crate::combinators::collect::BuildAction;
use crate::error::ParseError;
use crate::input::Span;
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::{AstValue, ParseState};

/// One alternative of an operator fold: a parser for the suffix/infix
/// part and the callback that builds the combined value.
pub struct FoldBranch {
    pub(crate) parser: ParserRef,
    pub(crate) action: BuildAction,
}

impl FoldBranch {
    pub fn new(
        parser: ParserRef,
        action: impl Fn(&ParseState, Span, &[AstValue]) -> AstValue + 'static,
    ) -> Self {
        Self {
            parser,
            action: Rc::new(action),
        }
    }
}

fn reduce(state: &mut ParseState, branch: &FoldBranch, frame: usize, start: usize) {
    let captured = state.stack()[frame..].to_vec();
    let value = (branch.action)(state, Span::new(start, state.pos()), &captured);
    state.replace_frame(frame, value);
}

pub(crate) struct LeftFold {
    pub(crate) operand: ParserRef,
    pub(crate) branches: Vec<FoldBranch>,
}

impl Parser for LeftFold {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let frame = state.stack_len();
        let start = state.pos();
        if !self.operand.parse(state)? {
            return Ok(false);
        }
        loop {
            let before = state.pos();
            let mut stepped = false;
            for branch in &self.branches {
                if branch.parser.parse(state)? {
                    reduce(state, branch, frame, start);
                    stepped = true;
                    break;
                }
            }
            // A zero-width step would loop forever.
            if !stepped || state.pos() == before {
                break;
            }
        }
        Ok(true)
    }

    fn children(&self) -> Vec<ParserRef> {
        let mut children = vec![self.operand.clone()];
        children.extend(self.branches.iter().map(|b| b.parser.clone()));
        children
    }

    fn kind_name(&self) -> &'static str {
        "left_fold"
    }

    fn shape(&self) -> Shape {
        Shape::Fold
    }
}

pub(crate) struct RightFold {
    pub(crate) operand: ParserRef,
    pub(crate) branches: Vec<FoldBranch>,
}

impl RightFold {
    fn level(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let frame = state.stack_len();
        let start = state.pos();
        if !self.operand.parse(state)? {
            return Ok(false);
        }
        for branch in &self.branches {
            let snapshot = state.snapshot();
            if branch.parser.parse(state)? {
                if self.level(state)? {
                    reduce(state, branch, frame, start);
                    return Ok(true);
                }
                // Matched the operator but not a right-hand side; undo the
                // operator and settle for the operand alone.
                state.rollback(snapshot)?;
            }
        }
        Ok(true)
    }
}

impl Parser for RightFold {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        self.level(state)
    }

    fn children(&self) -> Vec<ParserRef> {
        let mut children = vec![self.operand.clone()];
        children.extend(self.branches.iter().map(|b| b.parser.clone()));
        children
    }

    fn kind_name(&self) -> &'static str {
        "right_fold"
    }

    fn shape(&self) -> Shape {
        Shape::Fold
    }
}

//! Input-consuming primitives: literals and predicates.
//!
//! These are the terminals of the grammar: they match a fixed piece of
//! input, advance by what they matched, and are the parsers whose failure
//! positions feed furthest-error tracking. Predicates are not consulted at
//! EOF; consuming the sentinel would advance past the input length.

use std::any::Any;

use crate::error::ParseError;
use crate::input::SourceKind;
use crate::parser::{Parser, Shape};
use crate::state::ParseState;

pub(crate) struct CharLit {
    pub(crate) expected: char,
}

impl Parser for CharLit {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let got = match state.source().as_chars() {
            Some(chars) => chars.get(state.pos()).copied(),
            None => return Err(ParseError::wrong_mode(self.display_name(), SourceKind::Text)),
        };
        if got == Some(self.expected) {
            state.advance(1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn kind_name(&self) -> &'static str {
        "char"
    }

    fn shape(&self) -> Shape {
        Shape::Terminal { nullable: false }
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn display_name(&self) -> String {
        format!("'{}'", self.expected)
    }
}

pub(crate) struct StrLit {
    pub(crate) expected: Vec<char>,
    pub(crate) rendered: String,
}

impl Parser for StrLit {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let matched = match state.source().as_chars() {
            Some(chars) => chars[state.pos().min(chars.len())..].starts_with(&self.expected),
            None => return Err(ParseError::wrong_mode(self.display_name(), SourceKind::Text)),
        };
        if matched {
            state.advance(self.expected.len());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn kind_name(&self) -> &'static str {
        "string"
    }

    fn shape(&self) -> Shape {
        Shape::Terminal {
            nullable: self.expected.is_empty(),
        }
    }

    fn is_terminal(&self) -> bool {
        true
    }

    fn display_name(&self) -> String {
        format!("\"{}\"", self.rendered)
    }
}

pub(crate) struct CharPred {
    pub(crate) name: String,
    pub(crate) pred: Box<dyn Fn(char) -> bool>,
}

impl Parser for CharPred {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let matched = match state.source().as_chars() {
            Some(chars) => chars
                .get(state.pos())
                .is_some_and(|&c| (self.pred)(c)),
            None => return Err(ParseError::wrong_mode(self.display_name(), SourceKind::Text)),
        };
        if matched {
            state.advance(1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn kind_name(&self) -> &'static str {
        "char_pred"
    }

    fn rule_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn shape(&self) -> Shape {
        Shape::Terminal { nullable: false }
    }

    fn is_terminal(&self) -> bool {
        true
    }
}

pub(crate) struct AnyChar;

impl Parser for AnyChar {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let available = match state.source().as_chars() {
            Some(chars) => state.pos() < chars.len(),
            None => return Err(ParseError::wrong_mode(self.display_name(), SourceKind::Text)),
        };
        if available {
            state.advance(1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn kind_name(&self) -> &'static str {
        "any_char"
    }

    fn shape(&self) -> Shape {
        Shape::Terminal { nullable: false }
    }

    fn is_terminal(&self) -> bool {
        true
    }
}

pub(crate) struct ObjectPred {
    pub(crate) name: String,
    pub(crate) pred: Box<dyn Fn(&dyn Any) -> bool>,
}

impl Parser for ObjectPred {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let matched = match state.source().as_objects() {
            Some(items) => items
                .get(state.pos())
                .is_some_and(|item| (self.pred)(item.as_ref())),
            None => {
                return Err(ParseError::wrong_mode(
                    self.display_name(),
                    SourceKind::Objects,
                ));
            }
        };
        if matched {
            state.advance(1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn kind_name(&self) -> &'static str {
        "object_pred"
    }

    fn rule_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn shape(&self) -> Shape {
        Shape::Terminal { nullable: false }
    }

    fn is_terminal(&self) -> bool {
        true
    }
}

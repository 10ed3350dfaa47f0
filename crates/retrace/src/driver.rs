//! # Parse Driver
//!
//! The top-level entry points: run a root parser over a [`Source`] and
//! report either a success (end position plus the final AST stack) or a
//! failure (furthest error position plus the parsers that failed there).
//!
//! [`Grammar`] freezes a parser graph, keeps its rule parsers alive, and
//! caches the well-formedness verdict so the analysis runs once per
//! grammar rather than once per parse.

use std::cell::OnceCell;

use crate::analysis::check_well_formed;
use crate::error::{GrammarError, ParseError};
use crate::input::{Item, Source};
use crate::memo::Memoizer;
use crate::parser::{parser_addr, ParserExt, ParserRef};
use crate::state::{AstValue, Ctx, ParseState};

/// Configuration for one parse.
pub struct ParseOptions {
    /// Fail unless the root parser consumed the entire input.
    pub require_full_match: bool,
    /// Run the well-formedness analysis before parsing. [`Grammar`]
    /// disables this after its cached check.
    pub well_formed_check: bool,
    memoizers: Vec<(ParserRef, Box<dyn Memoizer>)>,
    initial_ctx: Option<Ctx>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            require_full_match: true,
            well_formed_check: true,
            memoizers: Vec::new(),
            initial_ctx: None,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn require_full_match(mut self, yes: bool) -> Self {
        self.require_full_match = yes;
        self
    }

    #[must_use]
    pub fn well_formed_check(mut self, yes: bool) -> Self {
        self.well_formed_check = yes;
        self
    }

    /// Bind a memoizer to a [`crate::memo::memo_with`] wrapper for this
    /// parse. Unbound wrappers fall back to their own factory.
    #[must_use]
    pub fn memoizer(mut self, parser: ParserRef, memoizer: impl Memoizer + 'static) -> Self {
        self.memoizers.push((parser, Box::new(memoizer)));
        self
    }

    /// Place `ctx` into the state's user-context slot before parsing.
    #[must_use]
    pub fn initial_ctx(mut self, ctx: Ctx) -> Self {
        self.initial_ctx = Some(ctx);
        self
    }
}

/// The user-visible result of a parse that ran to completion.
pub enum ParseOutcome {
    /// The root parser matched (and, under `require_full_match`, consumed
    /// everything). `ast` is the final AST stack, bottom first.
    Success { end_pos: usize, ast: Vec<AstValue> },
    /// The root parser failed, or matched a strict prefix under
    /// `require_full_match`. `causes` holds the display names of the
    /// parsers that failed at the furthest position.
    Failure {
        furthest_pos: usize,
        causes: Vec<String>,
    },
}

impl ParseOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// End position of a successful match.
    #[must_use]
    pub fn end_pos(&self) -> Option<usize> {
        match self {
            Self::Success { end_pos, .. } => Some(*end_pos),
            Self::Failure { .. } => None,
        }
    }

    /// The final AST stack; empty for failures.
    #[must_use]
    pub fn ast(&self) -> &[AstValue] {
        match self {
            Self::Success { ast, .. } => ast,
            Self::Failure { .. } => &[],
        }
    }

    /// Render the outcome, mapping positions through `position` (e.g. a
    /// line/column translator).
    #[must_use]
    pub fn describe(&self, position: &dyn Fn(usize) -> String) -> String {
        match self {
            Self::Success { end_pos, .. } => format!("match up to {}", position(*end_pos)),
            Self::Failure {
                furthest_pos,
                causes,
            } => {
                let mut out = format!("no match; furthest failure at {}", position(*furthest_pos));
                if !causes.is_empty() {
                    out.push_str(" while matching ");
                    out.push_str(&causes.join(", "));
                }
                out
            }
        }
    }
}

impl std::fmt::Debug for ParseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { end_pos, ast } => f
                .debug_struct("Success")
                .field("end_pos", end_pos)
                .field("ast_len", &ast.len())
                .finish(),
            Self::Failure {
                furthest_pos,
                causes,
            } => f
                .debug_struct("Failure")
                .field("furthest_pos", furthest_pos)
                .field("causes", causes)
                .finish(),
        }
    }
}

/// Run `root` over `source`.
///
/// # Errors
///
/// [`ParseError::IllFormed`] if the well-formedness check finds defects,
/// plus any fatal fault raised while parsing. A plain mismatch is *not*
/// an error; it comes back as [`ParseOutcome::Failure`].
pub fn parse(
    root: &ParserRef,
    source: Source,
    options: ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    if options.well_formed_check {
        let faults = check_well_formed(root);
        if !faults.is_empty() {
            return Err(ParseError::IllFormed(faults));
        }
    }

    let mut state = ParseState::new(source);
    state.set_initial_ctx(options.initial_ctx);
    for (parser, memoizer) in options.memoizers {
        state.bind_memoizer(parser_addr(&parser), memoizer);
    }

    let matched = root.parse(&mut state)?;
    let end_pos = state.pos();
    let full = end_pos == state.source().len();
    if matched && (full || !options.require_full_match) {
        Ok(ParseOutcome::Success {
            end_pos,
            ast: state.take_stack(),
        })
    } else {
        Ok(ParseOutcome::Failure {
            furthest_pos: state.furthest_pos().unwrap_or(end_pos),
            causes: state.furthest_causes(),
        })
    }
}

/// Run `root` over a string.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_text(
    root: &ParserRef,
    input: &str,
    options: ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    parse(root, Source::text(input), options)
}

/// Run `root` over a token sequence.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_objects(
    root: &ParserRef,
    items: Vec<Item>,
    options: ParseOptions,
) -> Result<ParseOutcome, ParseError> {
    parse(root, Source::objects(items), options)
}

/// A frozen parser graph: the root, plus any parsers that must stay alive
/// (recursion-bridge targets, rules referenced through `lazy`). The
/// well-formedness verdict is computed on first use and cached.
pub struct Grammar {
    root: ParserRef,
    rules: Vec<ParserRef>,
    verdict: OnceCell<Vec<GrammarError>>,
}

impl Grammar {
    #[must_use]
    pub fn new(root: ParserRef) -> Self {
        Self {
            root,
            rules: Vec::new(),
            verdict: OnceCell::new(),
        }
    }

    /// Keep `parser` alive for the lifetime of the grammar.
    #[must_use]
    pub fn register(mut self, parser: ParserRef) -> Self {
        self.rules.push(parser);
        self
    }

    #[must_use]
    pub fn root(&self) -> &ParserRef {
        &self.root
    }

    /// The registered rule parsers, in registration order.
    #[must_use]
    pub fn rules(&self) -> &[ParserRef] {
        &self.rules
    }

    /// Run (or recall) the well-formedness analysis.
    ///
    /// # Errors
    ///
    /// [`ParseError::IllFormed`] with the cached defects.
    pub fn validate(&self) -> Result<(), ParseError> {
        let faults = self.verdict.get_or_init(|| check_well_formed(&self.root));
        if faults.is_empty() {
            Ok(())
        } else {
            Err(ParseError::IllFormed(faults.clone()))
        }
    }

    /// Parse with the cached well-formedness verdict.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    pub fn parse(&self, source: Source, options: ParseOptions) -> Result<ParseOutcome, ParseError> {
        self.validate()?;
        parse(&self.root, source, options.well_formed_check(false))
    }
}

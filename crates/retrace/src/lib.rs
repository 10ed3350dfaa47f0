//! # Retrace
//!
//! Transactional PEG parser combinators for Rust.
//!
//! ## Overview
//!
//! Retrace recognizes a prefix of an input (characters or opaque tokens)
//! by running a graph of composable parsers with vertical backtracking:
//!
//! - **Single-parse rule**: at a given position and context a parser
//!   yields a deterministic result; ordered choice commits to the first
//!   match and never revisits it.
//! - **Transactional side effects**: AST construction goes through a
//!   journal of reversible effects that unwind automatically when a
//!   parser backtracks.
//! - **Memoization**: sub-parse outcomes can be cached per position,
//!   parser and user context, with bounded (LRU ring) or unbounded
//!   memoizers.
//! - **Furthest-error tracking**: failures report the deepest input
//!   position reached and the parsers that failed there.
//! - **Well-formedness analysis**: unprotected left recursion and
//!   repetition over nullable parsers are rejected before parsing.
//!
//! ## Quick Start
//!
//! An arithmetic-sum grammar (`E := T ('+' T)*`, `T := digit+`) that
//! folds matches into a left-leaning AST:
//!
//! ```rust
//! use std::rc::Rc;
//!
//! use retrace::combinators::{char_pred, collect, left_fold, lit, plus, seq, FoldBranch};
//! use retrace::{parse_text, ParseOptions};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Expr {
//!     Num(i64),
//!     Add(Rc<Expr>, Rc<Expr>),
//! }
//!
//! // T := digit+
//! let term = collect(
//!     plus(char_pred("digit", |c| c.is_ascii_digit())),
//!     |state, span, _frame| {
//!         let chars = state.source().as_chars().unwrap();
//!         let text: String = chars[span.start..span.end].iter().collect();
//!         Rc::new(Expr::Num(text.parse().unwrap()))
//!     },
//! );
//!
//! // E := T ('+' T)*
//! let expr = left_fold(
//!     term.clone(),
//!     [FoldBranch::new(seq([lit('+'), term]), |_state, _span, frame| {
//!         let left = frame[0].downcast_ref::<Expr>().unwrap().clone();
//!         let right = frame[1].downcast_ref::<Expr>().unwrap().clone();
//!         Rc::new(Expr::Add(Rc::new(left), Rc::new(right)))
//!     })],
//! );
//!
//! let outcome = parse_text(&expr, "1+22+3", ParseOptions::default()).unwrap();
//! assert_eq!(outcome.end_pos(), Some(6));
//! let ast = outcome.ast()[0].downcast_ref::<Expr>().unwrap();
//! assert_eq!(
//!     *ast,
//!     Expr::Add(
//!         Rc::new(Expr::Add(Rc::new(Expr::Num(1)), Rc::new(Expr::Num(22)))),
//!         Rc::new(Expr::Num(3)),
//!     ),
//! );
//! ```
//!
//! ## Modules
//!
//! - [`input`] - input sources (characters or opaque tokens) and spans
//! - [`state`] - the parse state, side-effect journal and snapshots
//! - [`parser`] - the parser contract and the transactional executor
//! - [`combinators`] - construction factories for the built-in parsers
//! - [`memo`] - memoizers and the memoizing wrapper parser
//! - [`analysis`] - grammar well-formedness analysis
//! - [`driver`] - top-level parse entry points and grammar registration
//! - [`error`] - fatal error taxonomy

pub mod analysis;
pub mod combinators;
pub mod driver;
pub mod error;
pub mod input;
pub mod memo;
pub mod parser;
pub mod state;

// Re-export commonly used types
pub use analysis::check_well_formed;
pub use driver::{parse, parse_objects, parse_text, Grammar, ParseOptions, ParseOutcome};
pub use error::{GrammarError, ParseError};
pub use input::{Item, Source, SourceKind, Span, EOF_CHAR};
pub use memo::{memo, memo_with, MemoCache, MemoEntry, MemoTable, Memoizer};
pub use parser::{Parser, ParserExt, ParserRef, Shape};
pub use state::{AstValue, Ctx, Effect, ParseState, SideEffect, Snapshot};

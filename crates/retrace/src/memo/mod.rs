//! # Memoization
//!
//! A [`Memoizer`] caches sub-parse outcomes keyed by input position, the
//! user context (by identity) and optionally the parser. Entries record
//! either a match (end position plus the journal delta to replay) or a
//! failure. A cache hit is indistinguishable from re-running the parser,
//! modulo the furthest-error side channel.
//!
//! Two implementations are provided:
//!
//! - [`MemoTable`]: unbounded map-backed cache (full packrat memoization)
//! - [`MemoCache`]: fixed-size ring that keeps the last `n` results
//!
//! The [`memo`] / [`memo_with`] wrappers put a memoizer in front of any
//! parser; memoizer instances are scoped to a single parse (see
//! [`crate::ParseOptions::memoizer`] for driver-level bindings).

mod cache;
mod parser;
mod table;

pub use cache::MemoCache;
pub use parser::{memo, memo_with};
pub use table::MemoTable;

use std::rc::Rc;

use smallvec::SmallVec;

use crate::parser::{parser_addr, ParserRef};
use crate::state::{Ctx, Effect};

/// One memoized outcome: a match over an input range together with the
/// side effects it logged, or a recorded failure (no end position, empty
/// delta).
#[derive(Clone)]
pub struct MemoEntry {
    /// The parser that produced this result.
    pub parser: Option<ParserRef>,
    /// Position at which the parser was invoked.
    pub start_pos: usize,
    /// End position of the match; `None` records a failure.
    pub end_pos: Option<usize>,
    /// Side effects to replay on a cache hit, in application order.
    pub delta: SmallVec<[Effect; 4]>,
    /// The user context at invocation, compared by identity.
    pub ctx: Option<Ctx>,
}

impl MemoEntry {
    /// Build an entry. For a failed invocation the end position is
    /// discarded and the delta is empty.
    #[must_use]
    pub fn new(
        success: bool,
        parser: Option<ParserRef>,
        start_pos: usize,
        end_pos: usize,
        delta: Vec<Effect>,
        ctx: Option<Ctx>,
    ) -> Self {
        Self {
            parser,
            start_pos,
            end_pos: success.then_some(end_pos),
            delta: if success {
                delta.into_iter().collect()
            } else {
                SmallVec::new()
            },
            ctx,
        }
    }

    /// Whether the entry records a successful invocation. A zero-length
    /// match is a success; only a missing end position is a failure.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.end_pos.is_some()
    }

    /// Whether this entry answers a query: same start position, same
    /// context identity, and (when `match_parser`) the same parser.
    #[must_use]
    pub fn matches(
        &self,
        match_parser: bool,
        parser: &ParserRef,
        pos: usize,
        ctx: Option<&Ctx>,
    ) -> bool {
        self.start_pos == pos
            && (!match_parser
                || self
                    .parser
                    .as_ref()
                    .is_some_and(|p| parser_addr(p) == parser_addr(parser)))
            && ctx_eq(self.ctx.as_ref(), ctx)
    }

    /// Render the entry for a memoization-table dump, mapping positions
    /// through `position`.
    #[must_use]
    pub fn listing_string(&self, position: &dyn Fn(usize) -> String, parser_name: bool) -> String {
        let start = position(self.start_pos);
        match self.end_pos {
            None => format!("at {start}: no match"),
            Some(end) => {
                let mut out = format!("from {start} to {}", position(end));
                if parser_name {
                    if let Some(parser) = &self.parser {
                        out.push_str(": ");
                        out.push_str(&parser.display_name());
                    }
                }
                out
            }
        }
    }
}

/// Context identity equality: both absent, or the same `Rc`.
pub(crate) fn ctx_eq(a: Option<&Ctx>, b: Option<&Ctx>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        _ => false,
    }
}

/// Context identity as a key component (`0` for no context).
pub(crate) fn ctx_addr(ctx: Option<&Ctx>) -> usize {
    ctx.map_or(0, |c| Rc::as_ptr(c) as *const () as usize)
}

/// A bounded or unbounded cache of parse outcomes.
pub trait Memoizer {
    /// Store an entry, possibly evicting an older one.
    fn memoize(&mut self, entry: MemoEntry);

    /// Look up the entry for `(parser, pos, ctx)`, if still cached.
    fn get(&self, parser: &ParserRef, pos: usize, ctx: Option<&Ctx>) -> Option<&MemoEntry>;

    /// Dump the cached entries, mapping positions through `position`.
    fn listing(&self, position: &dyn Fn(usize) -> String) -> String;
}

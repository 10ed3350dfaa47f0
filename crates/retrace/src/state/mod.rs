//! # Parse State
//!
//! One [`ParseState`] exists per parse invocation. It bundles the input,
//! the current position, the AST construction stack, the user-context
//! slot, the side-effect journal and the furthest-error record, and is
//! threaded by value through every `doparse` call.
//!
//! ## Transactionality
//!
//! The state is mutated speculatively: a caller takes a [`Snapshot`],
//! lets sub-parsers run, and either commits (keeping all applied effects)
//! or rolls back. Rollback walks the journal suffix in reverse, un-applies
//! every effect, and restores position and context from the snapshot. If
//! no external observation happens in between, the state is exactly what
//! it was, furthest-error fields excepted: those intentionally persist
//! to feed diagnostics.

mod effects;
mod journal;

pub use journal::{Effect, SideEffect, Snapshot};

use std::any::Any;
use std::rc::Rc;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::error::ParseError;
use crate::input::Source;
use crate::memo::{MemoEntry, Memoizer};
use crate::parser::{parser_addr, ParserRef};
use crate::state::effects::{Push, ReplaceFrame, SwapCtx};

/// A value pushed onto the AST stack. Opaque to the engine.
pub type AstValue = Rc<dyn Any>;

/// The user-context value. Compared by identity for memoization keys.
pub type Ctx = Rc<dyn Any>;

/// One parser name recorded as a cause of the furthest error.
struct Cause {
    addr: usize,
    name: String,
}

/// The furthest position at which a leaf parser failed, with the parsers
/// that failed there. Monotonic in position over a whole parse.
#[derive(Default)]
struct Furthest {
    pos: Option<usize>,
    causes: SmallVec<[Cause; 4]>,
}

/// The mutable state of one parse.
pub struct ParseState {
    source: Source,
    pos: usize,
    stack: Vec<AstValue>,
    ctx: Option<Ctx>,
    journal: Vec<Effect>,
    furthest: Furthest,
    memoizers: HashMap<usize, Box<dyn Memoizer>, ahash::RandomState>,
}

impl ParseState {
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self {
            source,
            pos: 0,
            stack: Vec::new(),
            ctx: None,
            journal: Vec::new(),
            furthest: Furthest::default(),
            memoizers: HashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    // --- input -----------------------------------------------------------

    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Advance the position by `n` items. Callers never advance past the
    /// input length; primitives check before consuming.
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    pub(crate) fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    // --- transactions ----------------------------------------------------

    /// Capture the current position, journal length and context.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            journal_len: self.journal.len(),
            ctx: self.ctx.clone(),
        }
    }

    /// Keep everything applied since `snapshot`. A no-op, present for
    /// symmetry with [`ParseState::rollback`].
    pub fn commit(&mut self, snapshot: Snapshot) {
        let _ = snapshot;
    }

    /// Undo every effect applied since `snapshot` (in reverse order),
    /// truncate the journal, and restore position and context.
    ///
    /// Furthest-error fields are left untouched.
    ///
    /// # Errors
    ///
    /// [`ParseError::InternalInvariant`] if the journal is shorter than it
    /// was when the snapshot was taken.
    pub fn rollback(&mut self, snapshot: Snapshot) -> Result<(), ParseError> {
        if snapshot.journal_len > self.journal.len() {
            return Err(ParseError::internal(
                "rollback",
                format!(
                    "snapshot journal length {} exceeds current length {}",
                    snapshot.journal_len,
                    self.journal.len()
                ),
            ));
        }
        let tail: Vec<Effect> = self.journal.drain(snapshot.journal_len..).collect();
        for effect in tail.iter().rev() {
            effect.unapply(self);
        }
        self.pos = snapshot.pos;
        self.ctx = snapshot.ctx;
        Ok(())
    }

    /// Log an effect that has already been applied.
    pub fn log(&mut self, effect: Effect) {
        self.journal.push(effect);
    }

    /// Apply an effect and log it.
    pub fn apply(&mut self, effect: Effect) {
        effect.apply(self);
        self.log(effect);
    }

    #[must_use]
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// The effects logged at or after `from`, in application order.
    #[must_use]
    pub fn journal_tail(&self, from: usize) -> Vec<Effect> {
        self.journal[from..].to_vec()
    }

    // --- AST stack -------------------------------------------------------

    #[must_use]
    pub fn stack(&self) -> &[AstValue] {
        &self.stack
    }

    #[must_use]
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Push a value onto the AST stack, through the journal.
    pub fn push(&mut self, value: AstValue) {
        self.apply(Rc::new(Push { value }));
    }

    /// Replace the stack suffix starting at `from` with `value`, through
    /// the journal. Used by collect actions and operator folds.
    pub fn replace_frame(&mut self, from: usize, value: AstValue) {
        let removed = self.stack[from..].to_vec();
        self.apply(Rc::new(ReplaceFrame {
            from,
            removed,
            value,
        }));
    }

    pub(crate) fn take_stack(&mut self) -> Vec<AstValue> {
        std::mem::take(&mut self.stack)
    }

    // --- user context ----------------------------------------------------

    #[must_use]
    pub fn ctx(&self) -> Option<&Ctx> {
        self.ctx.as_ref()
    }

    /// Swap the context slot, through the journal.
    pub fn swap_ctx(&mut self, new: Option<Ctx>) {
        let old = self.ctx.clone();
        self.apply(Rc::new(SwapCtx { old, new }));
    }

    pub(crate) fn set_initial_ctx(&mut self, ctx: Option<Ctx>) {
        self.ctx = ctx;
    }

    // --- furthest error --------------------------------------------------

    /// Record a leaf-level match failure at `pos`.
    ///
    /// Advancing the furthest position clears the previous causes; a
    /// failure at the same position adds to them; anything earlier is
    /// ignored.
    pub fn record_error(&mut self, parser: &ParserRef, pos: usize) {
        let addr = parser_addr(parser);
        match self.furthest.pos {
            Some(furthest) if pos < furthest => {}
            Some(furthest) if pos == furthest => {
                if !self.furthest.causes.iter().any(|c| c.addr == addr) {
                    self.furthest.causes.push(Cause {
                        addr,
                        name: parser.display_name(),
                    });
                }
            }
            _ => {
                self.furthest.pos = Some(pos);
                self.furthest.causes.clear();
                self.furthest.causes.push(Cause {
                    addr,
                    name: parser.display_name(),
                });
            }
        }
    }

    /// The furthest position at which a leaf failed, if any leaf failed.
    #[must_use]
    pub fn furthest_pos(&self) -> Option<usize> {
        self.furthest.pos
    }

    /// Display names of the parsers that failed at the furthest position.
    #[must_use]
    pub fn furthest_causes(&self) -> Vec<String> {
        self.furthest.causes.iter().map(|c| c.name.clone()).collect()
    }

    // --- memoizers -------------------------------------------------------

    pub(crate) fn bind_memoizer(&mut self, key: usize, memoizer: Box<dyn Memoizer>) {
        self.memoizers.insert(key, memoizer);
    }

    pub(crate) fn ensure_memoizer(
        &mut self,
        key: usize,
        create: impl FnOnce() -> Box<dyn Memoizer>,
    ) {
        self.memoizers.entry(key).or_insert_with(create);
    }

    pub(crate) fn memo_lookup(&self, key: usize, parser: &ParserRef) -> Option<MemoEntry> {
        let memoizer = self.memoizers.get(&key)?;
        memoizer.get(parser, self.pos, self.ctx.as_ref()).cloned()
    }

    pub(crate) fn memo_store(&mut self, key: usize, entry: MemoEntry) {
        if let Some(memoizer) = self.memoizers.get_mut(&key) {
            memoizer.memoize(entry);
        }
    }
}

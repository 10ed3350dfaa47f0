//! # Side Effects & Snapshots
//!
//! Every reversible mutation of the parse state goes through a
//! [`SideEffect`]: an operation that has already been performed when it is
//! logged, paired with an `unapply` that restores the state to what it was
//! immediately before. The journal applies effects in program order and
//! undoes them strictly last-in-first-out, so `apply` immediately followed
//! by `unapply` is always the identity.

use std::rc::Rc;

use crate::state::{Ctx, ParseState};

/// A reversible mutation of the parse state.
///
/// Implementations must guarantee that `unapply` exactly reverses `apply`
/// when invoked on the state `apply` produced. Effects are also *replayed*
/// by memoizers, so `apply` must not depend on anything outside the state
/// it receives.
pub trait SideEffect: 'static {
    fn apply(&self, state: &mut ParseState);
    fn unapply(&self, state: &mut ParseState);
}

/// A shared, journal-ready side effect.
pub type Effect = Rc<dyn SideEffect>;

/// A point in the parse that can be rolled back to.
///
/// Captures the position, the journal length and the context slot.
/// Furthest-error information is deliberately *not* captured: it survives
/// rollback to feed diagnostics.
#[derive(Clone)]
pub struct Snapshot {
    pub(crate) pos: usize,
    pub(crate) journal_len: usize,
    pub(crate) ctx: Option<Ctx>,
}

impl Snapshot {
    /// The position at which the snapshot was taken.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The journal length at which the snapshot was taken.
    #[must_use]
    pub fn journal_len(&self) -> usize {
        self.journal_len
    }
}

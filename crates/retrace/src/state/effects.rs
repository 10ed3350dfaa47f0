//! Built-in side effects: AST-stack push, frame replacement, context swap.

use crate::state::journal::SideEffect;
use crate::state::{AstValue, Ctx, ParseState};

/// Pushes one value onto the AST stack.
pub(crate) struct Push {
    pub(crate) value: AstValue,
}

impl SideEffect for Push {
    fn apply(&self, state: &mut ParseState) {
        state.stack.push(self.value.clone());
    }

    fn unapply(&self, state: &mut ParseState) {
        state.stack.pop();
    }
}

/// Replaces the stack suffix starting at `from` with a single value.
///
/// The removed suffix is kept so the effect can be undone and replayed.
pub(crate) struct ReplaceFrame {
    pub(crate) from: usize,
    pub(crate) removed: Vec<AstValue>,
    pub(crate) value: AstValue,
}

impl SideEffect for ReplaceFrame {
    fn apply(&self, state: &mut ParseState) {
        state.stack.truncate(self.from);
        state.stack.push(self.value.clone());
    }

    fn unapply(&self, state: &mut ParseState) {
        state.stack.pop();
        state.stack.extend(self.removed.iter().cloned());
    }
}

/// Swaps the user-context slot.
pub(crate) struct SwapCtx {
    pub(crate) old: Option<Ctx>,
    pub(crate) new: Option<Ctx>,
}

impl SideEffect for SwapCtx {
    fn apply(&self, state: &mut ParseState) {
        state.ctx = self.new.clone();
    }

    fn unapply(&self, state: &mut ParseState) {
        state.ctx = self.old.clone();
    }
}

//! The memoizing wrapper parser.

use std::rc::Rc;

use crate::error::ParseError;
use crate::memo::{MemoEntry, MemoTable, Memoizer};
use crate::parser::{Parser, ParserExt, ParserRef, Shape};
use crate::state::ParseState;

/// Wraps a delegate parser and consults a per-parse memoizer around it.
///
/// On a hit with a recorded match, the cached journal delta is replayed
/// and the position jumps to the recorded end; on a recorded failure it
/// fails immediately. On a miss the delegate runs normally and the new
/// journal tail is harvested into a fresh entry.
pub(crate) struct Memo {
    pub(crate) child: ParserRef,
    pub(crate) factory: Box<dyn Fn() -> Box<dyn Memoizer>>,
}

impl Memo {
    fn key(&self) -> usize {
        std::ptr::from_ref(self) as *const () as usize
    }

    fn replay(&self, state: &mut ParseState, entry: &MemoEntry) -> Result<bool, ParseError> {
        let Some(end_pos) = entry.end_pos else {
            return Ok(false);
        };
        if entry.start_pos != state.pos() {
            return Err(ParseError::MemoizerInconsistency {
                parser: self.child.display_name(),
                entry_pos: entry.start_pos,
                pos: state.pos(),
            });
        }
        for effect in &entry.delta {
            state.apply(effect.clone());
        }
        state.set_pos(end_pos);
        Ok(true)
    }
}

impl Parser for Memo {
    fn doparse(&self, state: &mut ParseState) -> Result<bool, ParseError> {
        let key = self.key();
        state.ensure_memoizer(key, || (self.factory)());
        if let Some(entry) = state.memo_lookup(key, &self.child) {
            return self.replay(state, &entry);
        }
        let start = state.pos();
        let journal_len = state.journal_len();
        let ctx = state.ctx().cloned();
        let matched = self.child.parse(state)?;
        let entry = MemoEntry::new(
            matched,
            Some(self.child.clone()),
            start,
            state.pos(),
            state.journal_tail(journal_len),
            ctx,
        );
        state.memo_store(key, entry);
        Ok(matched)
    }

    fn children(&self) -> Vec<ParserRef> {
        vec![self.child.clone()]
    }

    fn kind_name(&self) -> &'static str {
        "memo"
    }

    fn shape(&self) -> Shape {
        Shape::Bridge
    }
}

/// Memoize `child` with a full [`MemoTable`].
#[must_use]
pub fn memo(child: ParserRef) -> ParserRef {
    memo_with(child, || Box::new(MemoTable::new(true)))
}

/// Memoize `child` with a memoizer built by `factory`. The factory runs
/// once per parse (unless the driver bound a memoizer for this wrapper
/// up front), so parser nodes stay shareable across parses.
#[must_use]
pub fn memo_with(child: ParserRef, factory: impl Fn() -> Box<dyn Memoizer> + 'static) -> ParserRef {
    Rc::new(Memo {
        child,
        factory: Box::new(factory),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{char_pred, choice, collect, plus, seq, string};
    use crate::input::Source;
    use crate::memo::MemoCache;

    fn number() -> ParserRef {
        collect(
            plus(char_pred("digit", |c| c.is_ascii_digit())),
            |state, span, _| {
                let chars = state.source().as_chars().unwrap();
                let text: String = chars[span.start..span.end].iter().collect();
                Rc::new(text.parse::<i64>().unwrap())
            },
        )
    }

    fn outcome(parser: &ParserRef, input: &str) -> (bool, usize, Vec<i64>) {
        let mut state = ParseState::new(Source::text(input));
        let ok = parser.parse(&mut state).unwrap();
        let values = state
            .stack()
            .iter()
            .map(|v| *v.downcast_ref::<i64>().unwrap())
            .collect();
        (ok, state.pos(), values)
    }

    #[test]
    fn memoized_parser_is_equivalent_to_the_delegate() {
        let direct = number();
        // Two alternatives sharing a memoized prefix: the second attempt
        // hits the cache and must replay the same pushes.
        let memoized = memo(number());
        let grammar = choice([
            seq([memoized.clone(), string("!")]),
            seq([memoized, string("?")]),
        ]);
        let plain = choice([
            seq([direct.clone(), string("!")]),
            seq([direct, string("?")]),
        ]);

        for input in ["42?", "42!", "x", "7"] {
            assert_eq!(outcome(&grammar, input), outcome(&plain, input), "{input:?}");
        }
    }

    #[test]
    fn cached_failure_fails_fast() {
        let memoized = memo(number());
        let grammar = choice([
            seq([memoized.clone(), string("!")]),
            seq([memoized, string("?")]),
        ]);
        let (ok, pos, values) = outcome(&grammar, "abc");
        assert!(!ok);
        assert_eq!(pos, 0);
        assert!(values.is_empty());
    }

    #[test]
    fn ring_memoizer_works_as_the_cache() {
        let memoized = memo_with(number(), || Box::new(MemoCache::new(8, true)));
        let grammar = choice([
            seq([memoized.clone(), string("!")]),
            seq([memoized, string("?")]),
        ]);
        assert_eq!(outcome(&grammar, "123?"), (true, 4, vec![123]));
    }
}

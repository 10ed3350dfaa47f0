//! Unbounded map-backed memoizer.

use hashbrown::HashMap;

use crate::memo::{ctx_addr, MemoEntry, Memoizer};
use crate::parser::{parser_addr, ParserRef};
use crate::state::Ctx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MemoKey {
    pos: usize,
    ctx: usize,
    parser: usize,
}

/// A [`Memoizer`] that keeps every result it is passed (full packrat
/// memoization). A later entry for the same key replaces the earlier one.
pub struct MemoTable {
    map: HashMap<MemoKey, MemoEntry, ahash::RandomState>,
    match_parser: bool,
}

impl MemoTable {
    #[must_use]
    pub fn new(match_parser: bool) -> Self {
        Self {
            map: HashMap::with_hasher(ahash::RandomState::new()),
            match_parser,
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn key(&self, pos: usize, ctx: usize, parser: usize) -> MemoKey {
        MemoKey {
            pos,
            ctx,
            parser: if self.match_parser { parser } else { 0 },
        }
    }
}

impl Memoizer for MemoTable {
    fn memoize(&mut self, entry: MemoEntry) {
        let key = self.key(
            entry.start_pos,
            ctx_addr(entry.ctx.as_ref()),
            entry.parser.as_ref().map_or(0, parser_addr),
        );
        self.map.insert(key, entry);
    }

    fn get(&self, parser: &ParserRef, pos: usize, ctx: Option<&Ctx>) -> Option<&MemoEntry> {
        self.map
            .get(&self.key(pos, ctx_addr(ctx), parser_addr(parser)))
    }

    fn listing(&self, position: &dyn Fn(usize) -> String) -> String {
        let mut entries: Vec<&MemoEntry> = self.map.values().collect();
        entries.sort_by_key(|e| e.start_pos);
        entries
            .iter()
            .map(|e| e.listing_string(position, self.match_parser))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::lit;

    #[test]
    fn keeps_every_position() {
        let parser = lit('a');
        let mut table = MemoTable::new(true);
        for pos in 0..100 {
            table.memoize(MemoEntry::new(
                true,
                Some(parser.clone()),
                pos,
                pos + 1,
                Vec::new(),
                None,
            ));
        }
        assert_eq!(table.len(), 100);
        assert!(table.get(&parser, 0, None).is_some());
        assert!(table.get(&parser, 99, None).is_some());
    }

    #[test]
    fn cached_failures_are_returned() {
        let parser = lit('a');
        let mut table = MemoTable::new(true);
        table.memoize(MemoEntry::new(
            false,
            Some(parser.clone()),
            5,
            0,
            Vec::new(),
            None,
        ));
        let entry = table.get(&parser, 5, None).unwrap();
        assert!(!entry.succeeded());
    }
}

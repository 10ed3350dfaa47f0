//! Fixed-size LRU ring memoizer.

use crate::memo::{ctx_addr, MemoEntry, Memoizer};
use crate::parser::{parser_addr, ParserRef};
use crate::state::Ctx;

/// A [`Memoizer`] that keeps the last `num_slots` results it was passed,
/// overwriting the oldest on overflow.
///
/// With `match_parser` set, the parser participates in the key; otherwise
/// only the position and the context do (useful when a single token-level
/// parser is memoized and the parser is implied).
///
/// Slots are scanned from most to least recently added. A slot hash of
/// `0` marks a slot that was never filled and terminates the scan; the
/// hash function never produces `0` for a real entry.
pub struct MemoCache {
    hashes: Box<[u64]>,
    entries: Box<[Option<MemoEntry>]>,
    next: usize,
    num_slots: usize,
    match_parser: bool,
    hasher: ahash::RandomState,
}

impl MemoCache {
    /// Create a cache with `num_slots` slots.
    ///
    /// # Panics
    ///
    /// Panics if `num_slots` is zero.
    #[must_use]
    pub fn new(num_slots: usize, match_parser: bool) -> Self {
        assert!(num_slots > 0, "MemoCache needs at least one slot");
        Self {
            hashes: vec![0; num_slots].into_boxed_slice(),
            entries: vec![None; num_slots].into_boxed_slice(),
            next: 0,
            num_slots,
            match_parser,
            hasher: ahash::RandomState::new(),
        }
    }

    /// The number of slots in this cache.
    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    fn hash_key(&self, pos: usize, ctx: usize, parser: usize) -> u64 {
        let parser = if self.match_parser { parser } else { 0 };
        let hash = self.hasher.hash_one((pos, ctx, parser));
        // 0 is reserved for the empty-slot sentinel.
        if hash == 0 { 1 } else { hash }
    }
}

impl Memoizer for MemoCache {
    fn memoize(&mut self, entry: MemoEntry) {
        // Fill the next slot: unoccupied, or the oldest added.
        self.hashes[self.next] = self.hash_key(
            entry.start_pos,
            ctx_addr(entry.ctx.as_ref()),
            entry.parser.as_ref().map_or(0, parser_addr),
        );
        self.entries[self.next] = Some(entry);
        self.next += 1;
        if self.next == self.num_slots {
            self.next = 0;
        }
    }

    fn get(&self, parser: &ParserRef, pos: usize, ctx: Option<&Ctx>) -> Option<&MemoEntry> {
        let hash = self.hash_key(pos, ctx_addr(ctx), parser_addr(parser));
        // Most recently to least recently added.
        for i in 0..self.num_slots {
            let j = (self.next + self.num_slots - 1 - i) % self.num_slots;
            if self.hashes[j] == 0 {
                return None;
            }
            if self.hashes[j] == hash
                && let Some(entry) = &self.entries[j]
                && entry.matches(self.match_parser, parser, pos, ctx)
            {
                return Some(entry);
            }
        }
        None
    }

    fn listing(&self, position: &dyn Fn(usize) -> String) -> String {
        let mut entries: Vec<&MemoEntry> = self.entries.iter().flatten().collect();
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

    fn entry(parser: &ParserRef, pos: usize) -> MemoEntry {
        MemoEntry::new(true, Some(parser.clone()), pos, pos + 1, Vec::new(), None)
    }

    #[test]
    fn stores_and_retrieves_by_position() {
        let parser = lit('a');
        let mut cache = MemoCache::new(4, true);
        cache.memoize(entry(&parser, 2));
        let hit = cache.get(&parser, 2, None).unwrap();
        assert_eq!(hit.end_pos, Some(3));
        assert!(cache.get(&parser, 3, None).is_none());
    }

    #[test]
    fn overflow_evicts_the_oldest_entry() {
        let parser = lit('a');
        let mut cache = MemoCache::new(3, true);
        for pos in 0..4 {
            cache.memoize(entry(&parser, pos));
        }
        // Oldest entry (pos 0) was overwritten; the last three remain.
        assert!(cache.get(&parser, 0, None).is_none());
        for pos in 1..4 {
            assert!(cache.get(&parser, pos, None).is_some(), "pos {pos}");
        }
    }

    #[test]
    fn match_parser_distinguishes_parsers() {
        let a = lit('a');
        let b = lit('b');
        let mut cache = MemoCache::new(4, true);
        cache.memoize(entry(&a, 0));
        assert!(cache.get(&a, 0, None).is_some());
        assert!(cache.get(&b, 0, None).is_none());

        let mut loose = MemoCache::new(4, false);
        loose.memoize(entry(&a, 0));
        assert!(loose.get(&b, 0, None).is_some());
    }

    #[test]
    fn distinct_contexts_are_distinct_keys() {
        use std::rc::Rc;
        use crate::state::Ctx;
        let parser = lit('a');
        let ctx: Ctx = Rc::new("scope");
        let mut cache = MemoCache::new(4, true);
        cache.memoize(MemoEntry::new(
            true,
            Some(parser.clone()),
            0,
            1,
            Vec::new(),
            Some(ctx.clone()),
        ));
        assert!(cache.get(&parser, 0, Some(&ctx)).is_some());
        assert!(cache.get(&parser, 0, None).is_none());
        let other: Ctx = Rc::new("scope");
        assert!(cache.get(&parser, 0, Some(&other)).is_none());
    }
}

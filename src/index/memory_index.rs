use std::collections::BTreeMap;

use crate::core::types::{DocId, Position};
use crate::index::posting::Posting;

/// Component B. Accumulates postings for whatever subset of the corpus the
/// builder currently holds in memory, then is cleared after each spill.
/// Kept as a `BTreeMap` rather than a `HashMap` plus a separate sort step:
/// `vocabulary()` needs lexicographic term order on every spill, and a
/// `BTreeMap` gives that for free without re-sorting a `Vec` of keys each
/// time (the teacher's `in_memory_index` module resorts on every call,
/// which is wrong once this runs per-spill rather than once).
#[derive(Default)]
pub struct MemoryIndex {
    terms: BTreeMap<String, Vec<Posting>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        MemoryIndex { terms: BTreeMap::new() }
    }

    /// §4.B: insert a new posting if the term is new or the doc changed;
    /// otherwise insert the position into the current posting's ordered
    /// list, tolerating an out-of-order position by locating its slot.
    pub fn add(&mut self, term: &str, doc_id: DocId, position: Position) {
        let postings = self.terms.entry(term.to_string()).or_insert_with(Vec::new);

        match postings.last_mut() {
            Some(last) if last.doc_id == doc_id => {
                let positions = last.positions.get_or_insert_with(Vec::new);
                let slot = positions
                    .binary_search(&position)
                    .unwrap_or_else(|insert_at| insert_at);
                if positions.get(slot) != Some(&position) {
                    positions.insert(slot, position);
                }
                last.term_freq = positions.len() as u32;
            }
            _ => {
                postings.push(Posting::positional(doc_id, vec![position]));
            }
        }
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.terms.get(term).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Terms in lexicographic order, ready to encode and spill.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn into_sorted_entries(self) -> Vec<(String, Vec<Posting>)> {
        self.terms.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_positions_within_same_document() {
        let mut index = MemoryIndex::new();
        index.add("brown", DocId::new(0), Position(3));
        index.add("brown", DocId::new(0), Position(7));
        let postings = index.postings("brown");
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].positions.as_ref().unwrap(), &[Position(3), Position(7)]);
    }

    #[test]
    fn starts_new_posting_on_new_document() {
        let mut index = MemoryIndex::new();
        index.add("brown", DocId::new(0), Position(3));
        index.add("brown", DocId::new(1), Position(2));
        let postings = index.postings("brown");
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[1].doc_id, DocId::new(1));
    }

    #[test]
    fn vocabulary_is_lexicographic() {
        let mut index = MemoryIndex::new();
        index.add("fox", DocId::new(0), Position(0));
        index.add("brown", DocId::new(0), Position(1));
        let vocab: Vec<&str> = index.vocabulary().collect();
        assert_eq!(vocab, vec!["brown", "fox"]);
    }

    #[test]
    fn out_of_order_position_is_inserted_in_place() {
        let mut index = MemoryIndex::new();
        index.add("x", DocId::new(0), Position(5));
        index.add("x", DocId::new(0), Position(2));
        let postings = index.postings("x");
        assert_eq!(postings[0].positions.as_ref().unwrap(), &[Position(2), Position(5)]);
    }
}

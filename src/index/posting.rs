use crate::core::types::{DocId, Position};

/// Component A. `positions`, when present, is strictly ascending and its
/// length always equals `term_freq`. The discriminator is `positions`
/// itself: `Some` for a full decode (§4.C), `None` for a skip decode, which
/// reads `tf` off the wire but never materializes the position list. Using
/// a single record with an `Option` (per §9's design note) rather than two
/// separate types keeps every combinator in `query::eval` generic over both
/// decode modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32,
    pub positions: Option<Vec<Position>>,
}

impl Posting {
    /// Positional posting, as produced by a full decode.
    pub fn positional(doc_id: DocId, positions: Vec<Position>) -> Self {
        let term_freq = positions.len() as u32;
        Posting { doc_id, term_freq, positions: Some(positions) }
    }

    /// Bare posting carrying no position data, as produced by skip-decode.
    pub fn bare(doc_id: DocId, term_freq: u32) -> Self {
        Posting { doc_id, term_freq, positions: None }
    }

    pub fn has_positions(&self) -> bool {
        self.positions.is_some()
    }
}

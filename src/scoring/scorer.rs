use std::collections::HashMap;

use crate::core::config::Bm25Params;
use crate::core::types::DocId;
use crate::index::reader::DiskIndexReader;
use crate::query::ast::Query;

/// Component I. Both ranking modes are bag-of-terms: Boolean structure is
/// discarded (§4.I), and every call uses the skip-decoder path since
/// positions never factor into a score.
pub trait Scorer {
    /// Per-term query weight `w_{q,t}`.
    fn query_weight(&self, total_documents: u32, document_frequency: u32) -> f64;

    /// Per-term, per-document weight `w_{d,t}`.
    fn document_weight(&self, term_freq: u32, doc_length: u32, avg_doc_length: f64) -> f64;

    /// Whether the accumulator divides by `L_d` (TF-IDF) or not (BM25).
    fn normalize_by_document_weight(&self) -> bool;

    fn name(&self) -> &str;
}

pub struct TfIdfScorer;

impl Scorer for TfIdfScorer {
    fn query_weight(&self, total_documents: u32, document_frequency: u32) -> f64 {
        (1.0 + total_documents as f64 / document_frequency.max(1) as f64).ln()
    }

    fn document_weight(&self, term_freq: u32, _doc_length: u32, _avg_doc_length: f64) -> f64 {
        1.0 + (term_freq as f64).ln()
    }

    fn normalize_by_document_weight(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}

pub struct Bm25Scorer {
    pub params: Bm25Params,
}

impl Bm25Scorer {
    pub fn new(params: Bm25Params) -> Self {
        Bm25Scorer { params }
    }
}

impl Scorer for Bm25Scorer {
    fn query_weight(&self, total_documents: u32, document_frequency: u32) -> f64 {
        let n = total_documents as f64;
        let df = document_frequency as f64;
        (0.1f64).max(((n - df + 0.5) / (df + 0.5)).ln())
    }

    fn document_weight(&self, term_freq: u32, doc_length: u32, avg_doc_length: f64) -> f64 {
        let k1 = self.params.k1;
        let b = self.params.b;
        let tf = term_freq as f64;
        let len_norm = if avg_doc_length > 0.0 { doc_length as f64 / avg_doc_length } else { 0.0 };
        (2.2 * tf) / (k1 * (1.0 - b + b * len_norm) + tf)
    }

    fn normalize_by_document_weight(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDocument {
    pub doc_id: DocId,
    pub score: f64,
}

/// Ranks `query`'s distinct terms (bag-of-terms, §4.I) against `reader`
/// using `scorer`, returning results sorted by descending score, ties
/// broken by ascending DocId (invariant 12).
pub fn rank(query: &Query, reader: &DiskIndexReader, scorer: &dyn Scorer, top_k: Option<usize>) -> crate::core::error::Result<Vec<ScoredDocument>> {
    let total_documents = reader.total_documents();
    let avg_doc_length = reader.average_document_length();
    let weights = reader.document_weights();

    let mut accumulators: HashMap<DocId, f64> = HashMap::new();

    for term in query.distinct_terms() {
        let postings = reader.postings(&term, false)?;
        if postings.is_empty() {
            continue;
        }
        let df = postings.len() as u32;
        let w_qt = scorer.query_weight(total_documents, df);

        for posting in &postings {
            let doc_length = reader.document_length(posting.doc_id).unwrap_or(0);
            let w_dt = scorer.document_weight(posting.term_freq, doc_length, avg_doc_length);
            let mut contribution = w_qt * w_dt;

            if scorer.normalize_by_document_weight() {
                let l_d = weights.get(posting.doc_id.as_usize()).copied().unwrap_or(0.0);
                if l_d > 0.0 {
                    contribution /= l_d;
                } else {
                    contribution = 0.0;
                }
            }

            *accumulators.entry(posting.doc_id).or_insert(0.0) += contribution;
        }
    }

    let mut scored: Vec<ScoredDocument> = accumulators
        .into_iter()
        .map(|(doc_id, score)| ScoredDocument { doc_id, score })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });

    if let Some(k) = top_k {
        scored.truncate(k);
    }

    Ok(scored)
}

use crate::core::error::{Error, Result};
use crate::index::posting::Posting;
use crate::index::reader::DiskIndexReader;
use crate::query::ast::Query;

/// §4.H evaluation: every combinator is a single-pass merge over postings
/// already sorted by ascending DocId (§5 "Ordering guarantees"). `needPos`
/// propagates down from the caller — only a phrase literal and its term
/// children ever need `true`; Boolean-only evaluation always asks for
/// bare postings.
pub fn evaluate(query: &Query, reader: &DiskIndexReader, need_positions: bool) -> Result<Vec<Posting>> {
    match query {
        Query::TermLiteral(term) => reader.postings(term, need_positions),
        Query::PhraseLiteral(terms) => evaluate_phrase(terms, reader),
        Query::AndQuery(children) => evaluate_and(children, reader, need_positions),
        Query::OrQuery(children) => evaluate_or(children, reader, need_positions),
        Query::NotQuery(_) => Err(Error::protocol(
            "NotQuery has no defined postings list outside of an AndQuery",
        )),
    }
}

fn evaluate_and(children: &[Query], reader: &DiskIndexReader, need_positions: bool) -> Result<Vec<Posting>> {
    let mut children_iter = children.iter();
    let first = children_iter
        .next()
        .ok_or_else(|| Error::protocol("AndQuery with no children"))?;

    let mut accumulator = evaluate_positive_child(first, reader, need_positions)?;

    for child in children_iter {
        accumulator = match child {
            Query::NotQuery(inner) => {
                let negated = evaluate(inner, reader, false)?;
                set_difference(accumulator, &negated)
            }
            positive => {
                let next = evaluate_positive_child(positive, reader, need_positions)?;
                intersect(accumulator, next)
            }
        };
        if accumulator.is_empty() {
            break;
        }
    }

    Ok(accumulator)
}

fn evaluate_positive_child(query: &Query, reader: &DiskIndexReader, need_positions: bool) -> Result<Vec<Posting>> {
    match query {
        Query::NotQuery(_) => Err(Error::protocol(
            "AndQuery's first child cannot be a NotQuery (nothing to subtract from)",
        )),
        other => evaluate(other, reader, need_positions),
    }
}

fn evaluate_or(children: &[Query], reader: &DiskIndexReader, need_positions: bool) -> Result<Vec<Posting>> {
    let mut accumulator: Vec<Posting> = Vec::new();
    for child in children {
        let next = evaluate(child, reader, need_positions)?;
        accumulator = union(accumulator, next);
    }
    Ok(accumulator)
}

/// `AndQuery([A, B]).docIds = A.docIds ∩ B.docIds` (invariant 10): a single
/// sorted-merge pass, advancing whichever side is behind.
fn intersect(left: Vec<Posting>, right: Vec<Posting>) -> Vec<Posting> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].doc_id.cmp(&right[j].doc_id) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(left[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    result
}

/// Set difference: keep docIds in `accumulator` not present in `excluded`
/// (§4.H "for a negated child, keep docIds present in the accumulator but
/// NOT in the child").
fn set_difference(accumulator: Vec<Posting>, excluded: &[Posting]) -> Vec<Posting> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < accumulator.len() {
        match excluded.get(j) {
            None => {
                result.push(accumulator[i].clone());
                i += 1;
            }
            Some(next_excluded) => match accumulator[i].doc_id.cmp(&next_excluded.doc_id) {
                std::cmp::Ordering::Less => {
                    result.push(accumulator[i].clone());
                    i += 1;
                }
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Greater => {
                    j += 1;
                }
            },
        }
    }
    result
}

/// `OrQuery([A, B]).docIds = A.docIds ∪ B.docIds` (invariant 10); for
/// overlapping docIds the earlier posting (from `left`) is kept (§4.H).
fn union(left: Vec<Posting>, right: Vec<Posting>) -> Vec<Posting> {
    let mut result = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].doc_id.cmp(&right[j].doc_id) {
            std::cmp::Ordering::Less => {
                result.push(left[i].clone());
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.push(right[j].clone());
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                result.push(left[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    result.extend_from_slice(&left[i..]);
    result.extend_from_slice(&right[j..]);
    result
}

/// Positional intersection for a phrase of arbitrary length, reduced
/// pairwise left to right: each step requires exact adjacency (`k = 1`
/// only — §9 explicitly drops the source's general `k`-window variant).
/// An empty intermediate result short-circuits to empty (§4.H).
fn evaluate_phrase(terms: &[String], reader: &DiskIndexReader) -> Result<Vec<Posting>> {
    let mut current = reader.postings(&terms[0], true)?;
    if current.is_empty() {
        return Ok(current);
    }

    for term in &terms[1..] {
        let next = reader.postings(term, true)?;
        current = adjacent_merge(&current, &next);
        if current.is_empty() {
            return Ok(current);
        }
    }
    Ok(current)
}

/// Two-term adjacency merge: a DocId survives iff some position `p` in
/// `left` has `p + 1` in `right` (invariant 11). The surviving posting
/// carries `right`'s positions — "the positions of the final term in the
/// phrase" (§4.H) — so chaining this across a longer phrase naturally
/// yields the last term's matching positions.
fn adjacent_merge(left: &[Posting], right: &[Posting]) -> Vec<Posting> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].doc_id.cmp(&right[j].doc_id) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                let left_positions = left[i].positions.as_ref().expect("phrase evaluation needs positions");
                let right_positions = right[j].positions.as_ref().expect("phrase evaluation needs positions");
                let matched: Vec<_> = right_positions
                    .iter()
                    .filter(|&&p| left_positions.binary_search(&crate::core::types::Position(p.value().wrapping_sub(1))).is_ok())
                    .copied()
                    .collect();
                if !matched.is_empty() {
                    result.push(Posting::positional(left[i].doc_id, matched));
                }
                i += 1;
                j += 1;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::source::{DocumentRecord, DocumentSource};
    use crate::analysis::tokenizer::StandardTokenizer;
    use crate::builder::spimi::{build_index, NeverCancelled};
    use crate::core::config::IndexConfig;
    use crate::core::types::DocId;
    use crate::query::parser;

    struct FixedSource(Vec<DocumentRecord>);
    impl DocumentSource for FixedSource {
        fn documents(&self) -> crate::core::error::Result<Vec<DocumentRecord>> {
            Ok(self.0.clone())
        }
    }

    fn build_s3_corpus() -> (tempfile::TempDir, IndexConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path());
        let source = FixedSource(vec![
            DocumentRecord { doc_id: DocId::new(0), title: "d0".into(), content: "a b".into() },
            DocumentRecord { doc_id: DocId::new(1), title: "d1".into(), content: "a".into() },
            DocumentRecord { doc_id: DocId::new(2), title: "d2".into(), content: "b".into() },
        ]);
        let tokenizer = StandardTokenizer::default();
        build_index(&config, &source, &tokenizer, &NeverCancelled).unwrap();
        (dir, config)
    }

    #[test]
    fn s3_boolean_and_not() {
        let (_dir, config) = build_s3_corpus();
        let reader = DiskIndexReader::open(&config).unwrap();
        let query = parser::parse("a -b").unwrap();
        let result = evaluate(&query, &reader, false).unwrap();
        let doc_ids: Vec<u32> = result.iter().map(|p| p.doc_id.value()).collect();
        assert_eq!(doc_ids, vec![1]);
    }

    #[test]
    fn s2_phrase_query() {
        let dir = tempfile::tempdir().unwrap();
        let config = IndexConfig::new(dir.path());
        let source = FixedSource(vec![
            DocumentRecord { doc_id: DocId::new(0), title: "d0".into(), content: "the quick brown fox".into() },
            DocumentRecord { doc_id: DocId::new(1), title: "d1".into(), content: "the brown dog".into() },
        ]);
        let tokenizer = StandardTokenizer::default();
        build_index(&config, &source, &tokenizer, &NeverCancelled).unwrap();

        let reader = DiskIndexReader::open(&config).unwrap();
        let query = parser::parse("\"brown fox\"").unwrap();
        let result = evaluate(&query, &reader, true).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].doc_id, DocId::new(0));
        assert_eq!(result[0].positions.as_ref().unwrap(), &[crate::core::types::Position(4)]);
    }

    #[test]
    fn identity_laws_hold() {
        let (_dir, config) = build_s3_corpus();
        let reader = DiskIndexReader::open(&config).unwrap();

        let bare = evaluate(&Query::TermLiteral("a".into()), &reader, false).unwrap();
        let anded = evaluate(&Query::AndQuery(vec![Query::TermLiteral("a".into())]), &reader, false).unwrap();
        let ored = evaluate(&Query::OrQuery(vec![Query::TermLiteral("a".into())]), &reader, false).unwrap();
        assert_eq!(bare, anded);
        assert_eq!(bare, ored);
    }
}

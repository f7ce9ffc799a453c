//! Component C: the one binary record format shared by bucket spills and
//! the final postings file (§4.C).
//!
//! ```text
//! termLength : u32 (LE)
//! termBytes  : termLength bytes (UTF-8)
//! df         : u32 (LE)
//! repeated df times:
//!   docGap   : u32 (LE)
//!   tf       : u32 (LE)
//!   repeated tf times:
//!     posGap : u32 (LE)
//! ```
//!
//! No magic header, no version word — a record's own term-length prefix is
//! its integrity check (§6).

use std::io::{Read, Write};

use crate::core::error::{Error, Result};
use crate::core::types::{DocId, Position};
use crate::index::posting::Posting;

fn write_u32(writer: &mut impl Write, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => {
                Error::corruption("premature end of stream reading postings record")
            }
            _ => Error::from(e),
        })?;
    Ok(u32::from_le_bytes(buf))
}

/// Encodes `(term, postings)` per the layout above, returning the number of
/// bytes written. Rejects input that is not strictly sorted by DocId, or a
/// posting whose positions are not strictly ascending — the codec never
/// silently re-sorts (§4.C encoder contract).
pub fn encode_record(writer: &mut impl Write, term: &str, postings: &[Posting]) -> Result<u64> {
    if postings.is_empty() {
        return Err(Error::protocol(format!(
            "refusing to encode term '{term}' with zero postings"
        )));
    }

    let term_bytes = term.as_bytes();
    write_u32(writer, term_bytes.len() as u32)?;
    writer.write_all(term_bytes)?;
    write_u32(writer, postings.len() as u32)?;

    let mut bytes_written = 8u64 + term_bytes.len() as u64;
    let mut prev_doc_id: u32 = 0;
    let mut first = true;

    for posting in postings {
        if !first && posting.doc_id.value() <= prev_doc_id {
            return Err(Error::protocol(format!(
                "postings for term '{term}' are not strictly sorted by DocId"
            )));
        }
        let doc_gap = if first { posting.doc_id.value() } else { posting.doc_id.value() - prev_doc_id };
        prev_doc_id = posting.doc_id.value();
        first = false;

        let positions = posting.positions.as_ref().ok_or_else(|| {
            Error::protocol(format!("encoding term '{term}' requires positional postings"))
        })?;

        write_u32(writer, doc_gap)?;
        write_u32(writer, positions.len() as u32)?;
        bytes_written += 8;

        let mut prev_pos: u32 = 0;
        let mut first_pos = true;
        for position in positions {
            if !first_pos && position.value() <= prev_pos {
                return Err(Error::protocol(format!(
                    "positions for term '{term}' doc {} are not strictly ascending",
                    posting.doc_id.value()
                )));
            }
            let pos_gap = if first_pos { position.value() } else { position.value() - prev_pos };
            prev_pos = position.value();
            first_pos = false;
            write_u32(writer, pos_gap)?;
            bytes_written += 4;
        }
    }

    Ok(bytes_written)
}

/// Reads the self-describing term prefix (`termLength`, `termBytes`, `df`)
/// shared by every decode path. Callers that already know the expected term
/// (the disk reader) compare it against `term` and raise corruption on
/// mismatch; the merge step just trusts what it reads back from its own
/// bucket files.
pub fn read_term_prefix(reader: &mut impl Read) -> Result<(String, u32)> {
    let term_length = read_u32(reader)? as usize;
    let mut term_bytes = vec![0u8; term_length];
    reader.read_exact(&mut term_bytes).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::corruption("truncated term bytes"),
        _ => Error::from(e),
    })?;
    let term = String::from_utf8(term_bytes)
        .map_err(|e| Error::corruption(format!("term bytes are not valid UTF-8: {e}")))?;
    let df = read_u32(reader)?;
    Ok((term, df))
}

/// Full decode: materializes every position (§4.C "Decoder — full").
pub fn decode_postings_full(reader: &mut impl Read, df: u32) -> Result<Vec<Posting>> {
    let mut postings = Vec::with_capacity(df as usize);
    let mut doc_id = 0u32;
    for _ in 0..df {
        let doc_gap = read_u32(reader)?;
        doc_id += doc_gap;
        let tf = read_u32(reader)?;
        let mut positions = Vec::with_capacity(tf as usize);
        let mut position = 0u32;
        for _ in 0..tf {
            let pos_gap = read_u32(reader)?;
            position += pos_gap;
            positions.push(Position(position));
        }
        postings.push(Posting::positional(DocId::new(doc_id), positions));
    }
    Ok(postings)
}

/// Skip decode: reads `docGap`/`tf` but never materializes positions,
/// instead discarding `4 * tf` bytes (§4.C "Decoder — skip"). This is the
/// fast path non-phrase queries and ranked scoring use.
pub fn decode_postings_skip(reader: &mut (impl Read + std::io::Seek), df: u32) -> Result<Vec<Posting>> {
    let mut postings = Vec::with_capacity(df as usize);
    let mut doc_id = 0u32;
    for _ in 0..df {
        let doc_gap = read_u32(reader)?;
        doc_id += doc_gap;
        let tf = read_u32(reader)?;
        let skip_bytes = 4i64 * tf as i64;
        reader
            .seek(std::io::SeekFrom::Current(skip_bytes))
            .map_err(|_| Error::corruption("postings record ends before declared tf positions"))?;
        postings.push(Posting::bare(DocId::new(doc_id), tf));
    }
    Ok(postings)
}

/// Reads a whole `(term, postings)` record with full positions — used by
/// the SPIMI merge step, which needs real positions to union postings
/// lists from different bucket files.
pub fn decode_record_full(reader: &mut impl Read) -> Result<(String, Vec<Posting>)> {
    let (term, df) = read_term_prefix(reader)?;
    let postings = decode_postings_full(reader, df)?;
    Ok((term, postings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn posting(doc: u32, positions: &[u32]) -> Posting {
        Posting::positional(DocId::new(doc), positions.iter().map(|&p| Position(p)).collect())
    }

    #[test]
    fn round_trips_full_decode() {
        let postings = vec![posting(0, &[3]), posting(1, &[2, 5])];
        let mut buf = Vec::new();
        encode_record(&mut buf, "brown", &postings).unwrap();

        let mut cursor = Cursor::new(buf);
        let (term, decoded) = decode_record_full(&mut cursor).unwrap();
        assert_eq!(term, "brown");
        assert_eq!(decoded, postings);
    }

    #[test]
    fn skip_decode_matches_full_decode_doc_ids_and_tf() {
        let postings = vec![posting(0, &[3]), posting(1, &[2, 5]), posting(4, &[0])];
        let mut buf = Vec::new();
        encode_record(&mut buf, "fox", &postings).unwrap();

        let mut full_cursor = Cursor::new(&buf);
        let (_, df) = read_term_prefix(&mut full_cursor).unwrap();
        let full = decode_postings_full(&mut full_cursor, df).unwrap();

        let mut skip_cursor = Cursor::new(&buf);
        let (_, df) = read_term_prefix(&mut skip_cursor).unwrap();
        let skipped = decode_postings_skip(&mut skip_cursor, df).unwrap();

        assert_eq!(full.len(), skipped.len());
        for (f, s) in full.iter().zip(skipped.iter()) {
            assert_eq!(f.doc_id, s.doc_id);
            assert_eq!(f.term_freq, s.term_freq);
            assert!(s.positions.is_none());
        }
    }

    #[test]
    fn rejects_unsorted_doc_ids() {
        let postings = vec![posting(1, &[1]), posting(0, &[1])];
        let mut buf = Vec::new();
        let err = encode_record(&mut buf, "bad", &postings).unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::ProtocolError);
    }

    #[test]
    fn truncated_stream_is_corruption_not_silent_eof() {
        let postings = vec![posting(0, &[1, 2])];
        let mut buf = Vec::new();
        encode_record(&mut buf, "x", &postings).unwrap();
        buf.truncate(buf.len() - 2);

        let mut cursor = Cursor::new(buf);
        let err = decode_record_full(&mut cursor).unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::IndexCorruption);
    }
}

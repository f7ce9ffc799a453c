use nom::bytes::complete::take_while1;
use nom::IResult;

use crate::core::error::{Error, Result};
use crate::query::ast::Query;

/// §4.H grammar:
/// ```text
/// query      := subquery ( '+' subquery )*
/// subquery   := literal ( WS literal )*
/// literal    := '"' phrase '"' | '-' literal | term
/// phrase     := term ( WS term )+
/// term       := <token bytes>
/// ```
/// `+` never appears inside a term (terms are tokenizer output), so
/// splitting the whole query on `+` before parsing subqueries is safe and
/// matches the grammar's top-level precedence.
pub fn parse(input: &str) -> Result<Query> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::protocol("empty query"));
    }

    let disjuncts: Vec<Query> = trimmed
        .split('+')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_subquery)
        .collect::<Result<_>>()?;

    if disjuncts.is_empty() {
        return Err(Error::protocol("empty query"));
    }

    let query = if disjuncts.len() == 1 {
        disjuncts.into_iter().next().unwrap()
    } else {
        Query::OrQuery(disjuncts)
    };

    query.validate().map_err(Error::protocol)?;
    Ok(query)
}

/// `subquery := literal (WS literal)*`: every literal in a subquery is
/// conjoined (AND). A bare single literal collapses to itself rather than
/// an `AndQuery` of one — satisfies invariant 9's identity law without the
/// evaluator needing a special case.
fn parse_subquery(input: &str) -> Result<Query> {
    let mut literals = Vec::new();
    let mut remaining = input.trim_start();

    while !remaining.is_empty() {
        let (rest, literal) = parse_literal(remaining)?;
        literals.push(literal);
        remaining = rest.trim_start();
    }

    if literals.is_empty() {
        return Err(Error::protocol("empty subquery"));
    }

    Ok(if literals.len() == 1 {
        literals.into_iter().next().unwrap()
    } else {
        Query::AndQuery(literals)
    })
}

/// `literal := '"' phrase '"' | '-' literal | term`
fn parse_literal(input: &str) -> Result<(&str, Query)> {
    if let Some(rest) = input.strip_prefix('-') {
        let (rest, inner) = parse_literal(rest)?;
        return Ok((rest, Query::NotQuery(Box::new(inner))));
    }

    if let Some(rest) = input.strip_prefix('"') {
        return parse_phrase(rest);
    }

    let (rest, term) = parse_term(input)?;
    Ok((rest, Query::TermLiteral(term.to_string())))
}

/// `phrase := term (WS term)+`. §7: an unterminated quote is forgiven by
/// treating the dangling quoted span — up to the next unescaped subquery
/// boundary — as ordinary AND'd term literals instead of raising
/// `ProtocolError` (the reference parser's behavior; see DESIGN.md).
fn parse_phrase(input: &str) -> Result<(&str, Query)> {
    match input.find('"') {
        Some(end) => {
            let phrase_body = &input[..end];
            let rest = &input[end + 1..];
            let terms = split_terms(phrase_body)?;
            match terms.len() {
                // §4.H: "a single-term phrase is equivalent to a bare term".
                0 => return Err(Error::protocol("empty phrase literal")),
                1 => Ok((rest, Query::TermLiteral(terms.into_iter().next().unwrap()))),
                _ => Ok((rest, Query::PhraseLiteral(terms))),
            }
        }
        None => {
            let terms = split_terms(input)?;
            if terms.is_empty() {
                return Err(Error::protocol("unterminated phrase with no recoverable terms"));
            }
            let literals: Vec<Query> = terms.into_iter().map(Query::TermLiteral).collect();
            let recovered = if literals.len() == 1 {
                literals.into_iter().next().unwrap()
            } else {
                Query::AndQuery(literals)
            };
            Ok(("", recovered))
        }
    }
}

fn split_terms(input: &str) -> Result<Vec<String>> {
    let mut terms = Vec::new();
    let mut remaining = input.trim();
    while !remaining.is_empty() {
        let (rest, term) = parse_term(remaining)?;
        terms.push(term.to_string());
        remaining = rest.trim_start();
    }
    Ok(terms)
}

fn is_term_char(c: char) -> bool {
    !c.is_whitespace() && c != '"' && c != '+'
}

fn term_token(input: &str) -> IResult<&str, &str> {
    take_while1(is_term_char)(input)
}

fn parse_term(input: &str) -> Result<(&str, &str)> {
    term_token(input).map_err(|_| Error::protocol(format!("expected a term at '{input}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_term() {
        assert_eq!(parse("fox").unwrap(), Query::TermLiteral("fox".into()));
    }

    #[test]
    fn parses_conjunction_within_subquery() {
        let q = parse("brown fox").unwrap();
        assert_eq!(
            q,
            Query::AndQuery(vec![Query::TermLiteral("brown".into()), Query::TermLiteral("fox".into())])
        );
    }

    #[test]
    fn parses_disjunction_at_top_level() {
        let q = parse("cat + dog").unwrap();
        assert_eq!(
            q,
            Query::OrQuery(vec![Query::TermLiteral("cat".into()), Query::TermLiteral("dog".into())])
        );
    }

    #[test]
    fn parses_negation() {
        let q = parse("a -b").unwrap();
        assert_eq!(
            q,
            Query::AndQuery(vec![
                Query::TermLiteral("a".into()),
                Query::NotQuery(Box::new(Query::TermLiteral("b".into())))
            ])
        );
    }

    #[test]
    fn parses_phrase() {
        let q = parse("\"brown fox\"").unwrap();
        assert_eq!(q, Query::PhraseLiteral(vec!["brown".into(), "fox".into()]));
    }

    #[test]
    fn single_term_phrase_collapses_like_a_bare_term() {
        let q = parse("\"fox\"").unwrap();
        assert_eq!(q, Query::TermLiteral("fox".into()));
    }

    #[test]
    fn unterminated_phrase_recovers_as_and_of_terms() {
        let q = parse("\"brown fox").unwrap();
        assert_eq!(
            q,
            Query::AndQuery(vec![Query::TermLiteral("brown".into()), Query::TermLiteral("fox".into())])
        );
    }

    #[test]
    fn empty_query_is_protocol_error() {
        let err = parse("   ").unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::ProtocolError);
    }

    #[test]
    fn free_standing_not_is_rejected() {
        let err = parse("-a").unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::ProtocolError);
    }
}

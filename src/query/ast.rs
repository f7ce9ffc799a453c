/// The Boolean/phrase query language (§4.H): a tagged sum of five node
/// kinds, not an inheritance hierarchy (§9 design note). Every combinator
/// in `query::eval` dispatches on this enum's variant tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    TermLiteral(String),
    PhraseLiteral(Vec<String>),
    AndQuery(Vec<Query>),
    OrQuery(Vec<Query>),
    NotQuery(Box<Query>),
}

impl Query {
    /// §4.H: "a free-standing `NotQuery` has no defined postings list and
    /// MUST fail validation." Only the immediate children of an `AndQuery`
    /// may be a `NotQuery` — nesting one inside an `OrQuery`, a
    /// `PhraseLiteral`, or at the query root is a `ProtocolError`.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Query::TermLiteral(term) if term.is_empty() => {
                Err("empty term literal".to_string())
            }
            Query::TermLiteral(_) => Ok(()),
            Query::PhraseLiteral(terms) => {
                if terms.len() < 2 {
                    return Err("phrase literal must have at least two terms".to_string());
                }
                Ok(())
            }
            Query::NotQuery(_) => Err("free-standing NotQuery has no defined postings list".to_string()),
            Query::AndQuery(children) => {
                if children.is_empty() {
                    return Err("AndQuery with no children".to_string());
                }
                for child in children {
                    match child {
                        Query::NotQuery(inner) => inner.validate()?,
                        other => other.validate()?,
                    }
                }
                Ok(())
            }
            Query::OrQuery(children) => {
                if children.is_empty() {
                    return Err("OrQuery with no children".to_string());
                }
                for child in children {
                    if matches!(child, Query::NotQuery(_)) {
                        return Err("NotQuery is only valid as a direct child of AndQuery".to_string());
                    }
                    child.validate()?;
                }
                Ok(())
            }
        }
    }

    /// Every distinct term literal reachable from this AST, used by the
    /// bag-of-terms ranked scorer (§4.I) which ignores Boolean structure
    /// entirely.
    pub fn distinct_terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        self.collect_terms(&mut terms);
        terms.sort();
        terms.dedup();
        terms
    }

    fn collect_terms(&self, out: &mut Vec<String>) {
        match self {
            Query::TermLiteral(term) => out.push(term.clone()),
            Query::PhraseLiteral(terms) => out.extend(terms.iter().cloned()),
            Query::AndQuery(children) | Query::OrQuery(children) => {
                for child in children {
                    child.collect_terms(out);
                }
            }
            Query::NotQuery(inner) => inner.collect_terms(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_standing_not_fails_validation() {
        let q = Query::NotQuery(Box::new(Query::TermLiteral("a".into())));
        assert!(q.validate().is_err());
    }

    #[test]
    fn not_inside_and_is_valid() {
        let q = Query::AndQuery(vec![
            Query::TermLiteral("a".into()),
            Query::NotQuery(Box::new(Query::TermLiteral("b".into()))),
        ]);
        assert!(q.validate().is_ok());
    }

    #[test]
    fn not_inside_or_is_invalid() {
        let q = Query::OrQuery(vec![
            Query::TermLiteral("a".into()),
            Query::NotQuery(Box::new(Query::TermLiteral("b".into()))),
        ]);
        assert!(q.validate().is_err());
    }

    #[test]
    fn distinct_terms_dedupes_and_sorts() {
        let q = Query::AndQuery(vec![
            Query::TermLiteral("fox".into()),
            Query::PhraseLiteral(vec!["brown".into(), "fox".into()]),
        ]);
        assert_eq!(q.distinct_terms(), vec!["brown".to_string(), "fox".to_string()]);
    }
}

//! Boolean ranked query evaluation: `and` intersects with rank = minimum
//! count, `or` unions with rank = sum of group ranks.

use crate::index::Index;
use crate::tokenizer::MIN_WORD_LEN;
use crate::DocId;
use std::fmt;
use thiserror::Error;

/// The one recoverable, user-facing error class: a query line that fails
/// validation. The session reports it and moves on to the next line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("query cannot begin or end with an operator")]
    EdgeOperator,
    #[error("adjacent operators")]
    AdjacentOperators,
    #[error("invalid characters in '{0}' (words must be letters)")]
    NonAlphabetic(String),
}

/// A validated query token. Classification happens once, at parse time:
/// the raw tokens `and` / `or` (exactly, case-sensitively) are operators,
/// everything else is a word and gets lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    And,
    Or,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
        }
    }
}

/// One matched document, scoped to a single evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub doc_id: DocId,
    pub rank: u32,
}

/// Split a query line into validated tokens. A blank line is valid and
/// yields no tokens. Rules, in order: the query must not begin or end with
/// an operator, operators must not be adjacent, and words must be entirely
/// ASCII-alphabetic. Word length is deliberately NOT checked here: short
/// words validate fine and are simply inert during evaluation, because
/// nothing under three characters ever gets indexed.
pub fn parse(line: &str) -> Result<Vec<Token>, QueryError> {
    let raw: Vec<&str> = line.split_whitespace().collect();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let is_operator = |t: &str| t == "and" || t == "or";
    if is_operator(raw[0]) || is_operator(raw[raw.len() - 1]) {
        return Err(QueryError::EdgeOperator);
    }

    let mut tokens = Vec::with_capacity(raw.len());
    let mut last_was_operator = false;
    for token in raw {
        if is_operator(token) {
            if last_was_operator {
                return Err(QueryError::AdjacentOperators);
            }
            tokens.push(if token == "and" { Token::And } else { Token::Or });
            last_was_operator = true;
        } else {
            if !token.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(QueryError::NonAlphabetic(token.to_string()));
            }
            tokens.push(Token::Word(token.to_ascii_lowercase()));
            last_was_operator = false;
        }
    }
    Ok(tokens)
}

/// Evaluate validated tokens against `index`: split on `or` into
/// AND-groups, intersect within each group, then union the groups.
/// The result set is unordered; see [`ranked`].
pub fn evaluate(index: &Index, tokens: &[Token]) -> Vec<QueryResult> {
    let mut merged: Vec<QueryResult> = Vec::new();
    for group in tokens.split(|t| matches!(t, Token::Or)) {
        merge_or(&mut merged, and_group(index, group));
    }
    merged
}

/// Order results for presentation: rank descending, doc id ascending on
/// ties, so output is reproducible.
pub fn ranked(mut results: Vec<QueryResult>) -> Vec<QueryResult> {
    results.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.doc_id.cmp(&b.doc_id)));
    results
}

/// Parse, evaluate, and rank in one call.
pub fn execute(index: &Index, line: &str) -> Result<Vec<QueryResult>, QueryError> {
    let tokens = parse(line)?;
    Ok(ranked(evaluate(index, &tokens)))
}

/// A word participates in lookups only if it is long enough to have been
/// indexed; `and` tokens and short words are skipped.
fn qualifying(token: &Token) -> Option<&str> {
    match token {
        Token::Word(w) if w.len() >= MIN_WORD_LEN => Some(w),
        _ => None,
    }
}

/// Intersect the qualifying words of one AND-group. The first qualifying
/// word seeds the candidates with rank = its count per document; each
/// later word drops candidates it does not contain and lowers ranks to the
/// minimum count. Any qualifying word absent from the index voids the
/// whole group, including the seed.
fn and_group(index: &Index, group: &[Token]) -> Vec<QueryResult> {
    let mut words = group.iter().filter_map(qualifying);

    let Some(first) = words.next() else {
        return Vec::new();
    };
    let Some(postings) = index.get(first) else {
        return Vec::new();
    };
    let mut results: Vec<QueryResult> = postings
        .iter()
        .map(|p| QueryResult {
            doc_id: p.doc_id,
            rank: p.count,
        })
        .collect();

    for word in words {
        let Some(postings) = index.get(word) else {
            return Vec::new();
        };
        results.retain_mut(|r| {
            match postings.iter().find(|p| p.doc_id == r.doc_id) {
                Some(p) => {
                    r.rank = r.rank.min(p.count);
                    true
                }
                None => false,
            }
        });
    }
    results
}

/// Union one group's results into the accumulator. A document contributed
/// by several groups gets the sum of their ranks.
fn merge_or(acc: &mut Vec<QueryResult>, group: Vec<QueryResult>) {
    for result in group {
        match acc.iter_mut().find(|a| a.doc_id == result.doc_id) {
            Some(existing) => existing.rank += result.rank,
            None => acc.push(result),
        }
    }
}

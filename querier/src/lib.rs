//! Interactive query session: reads query lines, evaluates them against a
//! loaded index, and prints ranked results with page metadata.

use anyhow::Result;
use ferret_core::query::{self, Token};
use ferret_core::{Index, PageStore};
use scraper::{Html, Selector};
use std::io::{BufRead, Write};

/// How matched documents are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// One `rank / doc / url` line per match.
    Plain,
    /// Title, URL, meta description, and rank per match.
    Detailed,
}

pub struct Session<'a> {
    index: &'a Index,
    store: &'a PageStore,
    style: OutputStyle,
    quiet: bool,
}

impl<'a> Session<'a> {
    pub fn new(index: &'a Index, store: &'a PageStore, style: OutputStyle, quiet: bool) -> Self {
        Self {
            index,
            store,
            style,
            quiet,
        }
    }

    /// Run the query loop until `input` is exhausted. Each line is parsed
    /// and evaluated independently; a syntax error prints `[invalid query]`
    /// and the loop continues.
    pub fn run<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> Result<()> {
        if !self.quiet {
            write!(out, "> ")?;
            out.flush()?;
        }
        for line in input.lines() {
            let line = line?;
            if !self.quiet {
                writeln!(out, "Query: {line}")?;
            }
            match query::parse(&line) {
                Err(err) => {
                    tracing::debug!(%err, "rejected query");
                    writeln!(out, "[invalid query]")?;
                }
                Ok(tokens) if tokens.is_empty() => {}
                Ok(tokens) => {
                    if !self.quiet {
                        writeln!(out, "Normalized: {}", render_tokens(&tokens))?;
                    }
                    let results = query::ranked(query::evaluate(self.index, &tokens));
                    self.print_results(out, &results)?;
                }
            }
            if !self.quiet {
                writeln!(out, "-----------------------------------------------")?;
                write!(out, "> ")?;
                out.flush()?;
            }
        }
        if !self.quiet {
            writeln!(out)?;
        }
        Ok(())
    }

    fn print_results<W: Write>(&self, out: &mut W, results: &[query::QueryResult]) -> Result<()> {
        if results.is_empty() {
            writeln!(out, "No documents match.")?;
            return Ok(());
        }
        writeln!(out, "Matches {} documents (ranked):", results.len())?;
        for result in results {
            let page = match self.store.load(result.doc_id) {
                Ok(Some(page)) => page,
                Ok(None) | Err(_) => {
                    tracing::warn!(doc_id = result.doc_id, "could not load page for result");
                    continue;
                }
            };
            match self.style {
                OutputStyle::Plain => {
                    writeln!(out, "rank {:3} doc {:3}: {}", result.rank, result.doc_id, page.url)?;
                }
                OutputStyle::Detailed => {
                    let summary = PageSummary::scrape(&page.html);
                    writeln!(out)?;
                    writeln!(out, "{}", summary.title.as_deref().unwrap_or("No Title"))?;
                    writeln!(out, "{}", page.url)?;
                    writeln!(
                        out,
                        "{}",
                        summary.description.as_deref().unwrap_or("No Description")
                    )?;
                    writeln!(out, "Rank: {}", result.rank)?;
                }
            }
        }
        Ok(())
    }
}

fn render_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title and meta description scraped from a stored page, for the detailed
/// output style.
struct PageSummary {
    title: Option<String>,
    description: Option<String>,
}

impl PageSummary {
    fn scrape(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let title_sel = Selector::parse("title").expect("valid selector");
        let desc_sel = Selector::parse(r#"meta[name="description"]"#).expect("valid selector");

        let title = doc
            .select(&title_sel)
            .next()
            .map(|node| collapse_whitespace(&node.text().collect::<String>()))
            .filter(|t| !t.is_empty());
        let description = doc
            .select(&desc_sel)
            .next()
            .and_then(|node| node.value().attr("content"))
            .map(collapse_whitespace)
            .filter(|d| !d.is_empty());

        Self { title, description }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrapes_title_and_description() {
        let html = r#"<html><head><title> My
            Page </title><meta name="description" content="a test page">
            </head><body></body></html>"#;
        let summary = PageSummary::scrape(html);
        assert_eq!(summary.title.as_deref(), Some("My Page"));
        assert_eq!(summary.description.as_deref(), Some("a test page"));
    }

    #[test]
    fn missing_metadata_scrapes_to_none() {
        let summary = PageSummary::scrape("<html><body>plain</body></html>");
        assert!(summary.title.is_none());
        assert!(summary.description.is_none());
    }
}

//! Index persistence: one line per word, `<word> <docId> <count> ...`,
//! readable back into an identical index.

use crate::index::{Index, Posting};
use crate::DocId;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Save `index` to `path`, one word per line in the index's iteration
/// order. That order is stable, so saving the same index twice, or saving
/// a freshly loaded copy, produces byte-identical files.
pub fn save<P: AsRef<Path>>(index: &Index, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("creating index file {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for (word, postings) in index.iter() {
        write!(out, "{word}")?;
        for posting in postings {
            write!(out, " {} {}", posting.doc_id, posting.count)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Load an index from `path`. The first whitespace field of each line is
/// the word, taken verbatim; the rest is consumed in (doc id, count) pairs.
/// Lines with no word are skipped, and pair consumption stops at the first
/// field that fails to parse, keeping the pairs read so far.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Index> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("opening index file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut index = Index::new();
    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };
        let mut postings = Vec::new();
        while let (Some(doc), Some(count)) = (fields.next(), fields.next()) {
            let (Ok(doc_id), Ok(count)) = (doc.parse::<DocId>(), count.parse::<u32>()) else {
                break;
            };
            postings.push(Posting { doc_id, count });
        }
        index.insert_postings(word.to_string(), postings);
    }
    Ok(index)
}

//! Crawler page files: one file per document, named by its numeric id,
//! holding the URL, crawl depth, and raw HTML.

use crate::tokenizer;
use crate::DocId;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// One crawled document. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub depth: u32,
    pub html: String,
}

impl Page {
    pub fn new(url: impl Into<String>, depth: u32, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            html: html.into(),
        }
    }

    /// Indexable words of the page body, normalized.
    pub fn words(&self) -> Vec<String> {
        tokenizer::words(&self.html)
    }
}

/// A directory of numbered page files. Ids start at 1; the first missing id
/// marks the end of the corpus.
#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
}

impl PageStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn page_path(&self, id: DocId) -> PathBuf {
        self.dir.join(id.to_string())
    }

    /// Write `page` as `<dir>/<id>` in the crawler file format:
    /// URL line, depth line, html byte length line, then the raw bytes.
    pub fn save(&self, page: &Page, id: DocId) -> Result<()> {
        let path = self.page_path(id);
        let file = File::create(&path)
            .with_context(|| format!("creating page file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write!(out, "{}\n{}\n{}\n{}", page.url, page.depth, page.html.len(), page.html)?;
        out.flush()?;
        Ok(())
    }

    /// Load page `id`. `Ok(None)` means the file does not exist, which is
    /// the normal end-of-corpus signal; a file that exists but cannot be
    /// parsed is an error.
    pub fn load(&self, id: DocId) -> Result<Option<Page>> {
        let path = self.page_path(id);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("opening page file {}", path.display()))
            }
        };
        let mut reader = BufReader::new(file);

        let url = read_header_line(&mut reader)
            .with_context(|| format!("reading URL from {}", path.display()))?;
        let depth: u32 = read_header_line(&mut reader)?
            .parse()
            .with_context(|| format!("parsing depth in {}", path.display()))?;
        let html_len: usize = read_header_line(&mut reader)?
            .parse()
            .with_context(|| format!("parsing html length in {}", path.display()))?;

        let mut buf = vec![0u8; html_len];
        reader
            .read_exact(&mut buf)
            .with_context(|| format!("reading {html_len} html bytes from {}", path.display()))?;
        let html = String::from_utf8_lossy(&buf).into_owned();

        Ok(Some(Page { url, depth, html }))
    }

    /// Precondition check used by the indexer and querier: a valid crawl
    /// directory must contain a loadable page 1.
    pub fn has_first_page(&self) -> bool {
        matches!(self.load(1), Ok(Some(_)))
    }
}

fn read_header_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        bail!("page file truncated");
    }
    Ok(line.trim_end().to_string())
}

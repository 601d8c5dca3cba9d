//! The inverted index: normalized word → postings list, plus construction
//! from a crawl directory.

use crate::page::PageStore;
use crate::DocId;
use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// Occurrences of one word in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub count: u32,
}

/// Mapping from normalized word to its postings list. Doc ids are unique
/// within a list; list order is first-occurrence order during construction
/// and file order after a load. The backing map is a `BTreeMap` so that
/// iteration is deterministic and repeated saves of the same index are
/// byte-identical.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Index {
    words: BTreeMap<String, Vec<Posting>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over every page in `store`, scanning ids 1, 2, 3, …
    /// until the first missing id. A missing page 1 means `store` is not a
    /// valid crawl directory and is the only fatal case.
    pub fn build(store: &PageStore) -> Result<Self> {
        let mut index = Index::new();
        let mut doc_id: DocId = 1;
        loop {
            let page = match store.load(doc_id) {
                Ok(Some(page)) => page,
                Ok(None) if doc_id == 1 => {
                    bail!(
                        "no page 1 in {}: not a valid crawl directory",
                        store.dir().display()
                    )
                }
                Ok(None) => break,
                Err(err) if doc_id == 1 => return Err(err),
                Err(err) => {
                    // A malformed file mid-corpus ends the scan, same as a gap.
                    tracing::warn!(doc_id, %err, "unreadable page file, stopping scan");
                    break;
                }
            };
            tracing::debug!(doc_id, url = %page.url, "indexing page");
            for word in page.words() {
                index.add_occurrence(&word, doc_id);
            }
            doc_id += 1;
        }
        tracing::info!(pages = doc_id - 1, words = index.len(), "index built");
        Ok(index)
    }

    /// Record one occurrence of `word` (already normalized) in `doc_id`.
    pub fn add_occurrence(&mut self, word: &str, doc_id: DocId) {
        let postings = self.words.entry(word.to_string()).or_default();
        match postings.iter_mut().find(|p| p.doc_id == doc_id) {
            Some(posting) => posting.count += 1,
            None => postings.push(Posting { doc_id, count: 1 }),
        }
    }

    /// Install a whole postings list for `word`, as read from an index file.
    pub fn insert_postings(&mut self, word: String, postings: Vec<Posting>) {
        self.words.insert(word, postings);
    }

    pub fn get(&self, word: &str) -> Option<&[Posting]> {
        self.words.get(word).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.words.iter().map(|(w, p)| (w.as_str(), p.as_slice()))
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use tempfile::tempdir;

    #[test]
    fn add_occurrence_counts_and_appends() {
        let mut index = Index::new();
        index.add_occurrence("cat", 1);
        index.add_occurrence("cat", 1);
        index.add_occurrence("cat", 2);
        index.add_occurrence("dog", 2);

        assert_eq!(
            index.get("cat"),
            Some(&[Posting { doc_id: 1, count: 2 }, Posting { doc_id: 2, count: 1 }][..])
        );
        assert_eq!(index.get("dog"), Some(&[Posting { doc_id: 2, count: 1 }][..]));
        assert_eq!(index.get("bird"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn build_indexes_pages_until_first_gap() {
        let dir = tempdir().unwrap();
        let store = PageStore::new(dir.path());
        store
            .save(&Page::new("https://a.example/", 0, "<p>cat cat dog</p>"), 1)
            .unwrap();
        store
            .save(&Page::new("https://a.example/b", 1, "<p>dog bird</p>"), 2)
            .unwrap();
        // id 4 is unreachable past the gap at 3
        store
            .save(&Page::new("https://a.example/c", 1, "<p>never indexed</p>"), 4)
            .unwrap();

        let index = Index::build(&store).unwrap();
        assert_eq!(
            index.get("cat"),
            Some(&[Posting { doc_id: 1, count: 2 }][..])
        );
        assert_eq!(
            index.get("dog"),
            Some(&[Posting { doc_id: 1, count: 1 }, Posting { doc_id: 2, count: 1 }][..])
        );
        assert_eq!(index.get("never"), None);
    }

    #[test]
    fn build_fails_without_page_one() {
        let dir = tempdir().unwrap();
        let store = PageStore::new(dir.path());
        store
            .save(&Page::new("https://a.example/", 0, "<p>cat</p>"), 2)
            .unwrap();
        assert!(Index::build(&store).is_err());
    }

    #[test]
    fn short_and_non_alphabetic_tokens_never_become_keys() {
        let dir = tempdir().unwrap();
        let store = PageStore::new(dir.path());
        store
            .save(&Page::new("https://a.example/", 0, "to be 42 x1y cats!"), 1)
            .unwrap();

        let index = Index::build(&store).unwrap();
        assert!(index.is_empty());
    }
}

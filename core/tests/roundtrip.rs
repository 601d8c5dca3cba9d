//! Index persistence round-trip: an index built from real page files,
//! saved, reloaded, and saved again must produce byte-identical files.

use ferret_core::{persist, Index, Page, PageStore};
use tempfile::tempdir;

fn crawl_fixture(store: &PageStore) {
    let pages = [
        ("https://example.com/", 0, "<html><title>Home</title><body>playground for cats cats cats</body></html>"),
        ("https://example.com/a", 1, "<body>cats and dogs share the playground</body>"),
        ("https://example.com/b", 1, "<body>dogs dogs dogs bark</body>"),
    ];
    for (id, (url, depth, html)) in pages.iter().enumerate() {
        store
            .save(&Page::new(*url, *depth, *html), (id + 1) as u32)
            .unwrap();
    }
}

#[test]
fn built_index_round_trips_byte_identically() {
    let dir = tempdir().unwrap();
    let store = PageStore::new(dir.path());
    crawl_fixture(&store);

    let index = Index::build(&store).unwrap();
    let first = dir.path().join("index.dat");
    let second = dir.path().join("index_reload.dat");

    persist::save(&index, &first).unwrap();
    let reloaded = persist::load(&first).unwrap();
    persist::save(&reloaded, &second).unwrap();

    let a = std::fs::read(&first).unwrap();
    let b = std::fs::read(&second).unwrap();
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn reloaded_index_preserves_words_and_counts() {
    let dir = tempdir().unwrap();
    let store = PageStore::new(dir.path());
    crawl_fixture(&store);

    let index = Index::build(&store).unwrap();
    let path = dir.path().join("index.dat");
    persist::save(&index, &path).unwrap();
    let reloaded = persist::load(&path).unwrap();

    assert_eq!(reloaded.len(), index.len());
    for (word, postings) in index.iter() {
        assert_eq!(reloaded.get(word), Some(postings), "postings for '{word}'");
    }
}

#[test]
fn repeated_saves_of_same_index_are_stable() {
    let dir = tempdir().unwrap();
    let store = PageStore::new(dir.path());
    crawl_fixture(&store);
    let index = Index::build(&store).unwrap();

    let first = dir.path().join("a.dat");
    let second = dir.path().join("b.dat");
    persist::save(&index, &first).unwrap();
    persist::save(&index, &second).unwrap();
    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

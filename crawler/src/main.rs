use anyhow::{Context, Result};
use clap::Parser;
use ferret_core::{DocId, Page, PageStore};
use reqwest::{header, Client};
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

const MAX_PAGE_BYTES: usize = 2 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Crawl a site breadth-first into numbered page files", long_about = None)]
struct Cli {
    /// Seed URL to start from
    seed: String,
    /// Directory to write numbered page files into
    page_dir: String,
    /// Maximum link depth to follow from the seed
    max_depth: u32,
    /// Pause between requests in milliseconds
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent string for requests
    #[arg(long, default_value = "ferret-bot/0.1 (+https://example.com/bot)")]
    user_agent: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    probe_writable(&args.page_dir)?;
    let seed = Url::parse(&args.seed)
        .or_else(|_| Url::parse(&format!("https://{}", args.seed)))
        .with_context(|| format!("invalid seed URL '{}'", args.seed))?;

    let client = Client::builder()
        .user_agent(args.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;
    let store = PageStore::new(&args.page_dir);
    let link_sel = Selector::parse("a[href]").expect("valid selector");

    let mut seen: HashSet<String> = HashSet::new();
    let mut frontier: VecDeque<(Url, u32)> = VecDeque::new();
    seen.insert(norm(&seed));
    frontier.push_back((seed.clone(), 0));

    let mut doc_id: DocId = 1;
    while let Some((url, depth)) = frontier.pop_front() {
        tracing::info!(%url, depth, "crawling");
        let html = match fetch(&client, &url).await {
            Ok(Some(html)) => html,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(%url, %err, "fetch failed, skipping");
                continue;
            }
        };

        let page = Page::new(norm(&url), depth, html);
        store
            .save(&page, doc_id)
            .with_context(|| format!("saving page {doc_id}"))?;
        doc_id += 1;

        if depth < args.max_depth {
            for link in extract_links(&page.html, &url, &link_sel) {
                if !is_internal(&link, &seed) {
                    continue;
                }
                if seen.insert(norm(&link)) {
                    frontier.push_back((link, depth + 1));
                }
            }
        }

        if args.delay_ms > 0 {
            sleep(Duration::from_millis(args.delay_ms)).await;
        }
    }

    tracing::info!(pages = doc_id - 1, dir = %args.page_dir, "crawl complete");
    Ok(())
}

/// The original crawler's directory check: the page directory must exist
/// and accept a probe file before any fetching starts.
fn probe_writable(dir: &str) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating page directory '{dir}'"))?;
    let probe = std::path::Path::new(dir).join(".crawler");
    fs::write(&probe, b"").with_context(|| format!("page directory '{dir}' is not writable"))?;
    fs::remove_file(&probe).ok();
    Ok(())
}

/// Fetch one page. `Ok(None)` means the response is usable but not an HTML
/// page we want (bad status, wrong content type, oversized).
async fn fetch(client: &Client, url: &Url) -> Result<Option<String>> {
    let resp = client.get(url.clone()).send().await?;
    if !resp.status().is_success() {
        return Ok(None);
    }
    if let Some(ct) = resp.headers().get(header::CONTENT_TYPE) {
        if let Ok(value) = ct.to_str() {
            if !value.starts_with("text/html") {
                return Ok(None);
            }
        }
    }
    let bytes = resp.bytes().await?;
    if bytes.len() > MAX_PAGE_BYTES {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&bytes).to_string()))
}

/// Resolve every `<a href>` on the page against its URL, keeping http(s)
/// links only.
fn extract_links(html: &str, base: &Url, link_sel: &Selector) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let mut links = Vec::new();
    for anchor in doc.select(link_sel) {
        if let Some(href) = anchor.value().attr("href") {
            if let Ok(url) = Url::parse(href).or_else(|_| base.join(href)) {
                if url.scheme().starts_with("http") {
                    links.push(url);
                }
            }
        }
    }
    links
}

/// Internal links stay on the seed's host; everything else is ignored.
fn is_internal(url: &Url, seed: &Url) -> bool {
    url.host_str() == seed.host_str()
}

/// Canonical form for the seen-set and for saved page files: the URL with
/// its fragment dropped.
fn norm(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_strips_fragments() {
        let url = Url::parse("https://example.com/page#section").unwrap();
        assert_eq!(norm(&url), "https://example.com/page");
    }

    #[test]
    fn internal_means_same_host() {
        let seed = Url::parse("https://example.com/").unwrap();
        assert!(is_internal(&Url::parse("https://example.com/a/b").unwrap(), &seed));
        assert!(!is_internal(&Url::parse("https://other.example/").unwrap(), &seed));
    }

    #[test]
    fn extract_links_resolves_relative_hrefs() {
        let sel = Selector::parse("a[href]").unwrap();
        let base = Url::parse("https://example.com/dir/").unwrap();
        let html = r#"<a href="child.html">c</a> <a href="/root.html">r</a>
                      <a href="mailto:x@example.com">m</a>"#;
        let links = extract_links(html, &base, &sel);
        assert_eq!(
            links,
            vec![
                Url::parse("https://example.com/dir/child.html").unwrap(),
                Url::parse("https://example.com/root.html").unwrap(),
            ]
        );
    }
}

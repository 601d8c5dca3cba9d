use anyhow::{bail, Context, Result};
use clap::Parser;
use ferret_core::{persist, Index, PageStore};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build an inverted index from a crawl directory", long_about = None)]
struct Cli {
    /// Directory of numbered page files produced by the crawler
    page_dir: String,
    /// File to save the index to
    index_file: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let store = PageStore::new(&cli.page_dir);
    if !store.has_first_page() {
        bail!(
            "'{}' is not a valid crawl directory (page 1 missing or unreadable)",
            cli.page_dir
        );
    }

    let index = Index::build(&store)?;
    persist::save(&index, &cli.index_file)
        .with_context(|| format!("saving index to '{}'", cli.index_file))?;
    tracing::info!(words = index.len(), file = %cli.index_file, "index saved");
    Ok(())
}

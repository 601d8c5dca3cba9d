use anyhow::{bail, Context, Result};
use clap::Parser;
use ferret_core::{persist, PageStore};
use ferret_querier::{OutputStyle, Session};
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "querier")]
#[command(about = "Answer boolean ranked queries against a saved index", long_about = None)]
struct Cli {
    /// Directory of numbered page files produced by the crawler
    page_dir: String,
    /// Index file produced by the indexer
    index_file: String,
    /// Suppress the prompt and query echo (results still print)
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
    /// Print one-line results instead of title/description blocks
    #[arg(long, default_value_t = false)]
    plain: bool,
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
    let index = persist::load(&cli.index_file)
        .with_context(|| format!("loading index from '{}'", cli.index_file))?;

    let style = if cli.plain {
        OutputStyle::Plain
    } else {
        OutputStyle::Detailed
    };
    let session = Session::new(&index, &store, style, cli.quiet);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    session.run(stdin.lock(), &mut stdout)
}

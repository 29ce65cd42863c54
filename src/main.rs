use clap::Parser;
use dotenv::dotenv;

use page_summarizer::composer::Composer;
use page_summarizer::config::Config;
use page_summarizer::error::Result;
use page_summarizer::extractor::Extractor;

/// Summarize a single webpage into a fixed HTML template.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the page to summarize
    url: String,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(&args.url).await {
        eprintln!("[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(url: &str) -> Result<()> {
    // Configuration is checked before any network activity.
    let config = Config::from_env()?;

    let extractor = Extractor::new()?;
    let page = extractor.extract(url).await?;

    let composer = Composer::new(config)?;
    let summary = composer.summarize(&page).await?;

    // The summary document is the sole payload on stdout.
    println!("{summary}");
    Ok(())
}

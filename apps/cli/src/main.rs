//! Enhancer CLI: publish enhanced versions of the latest article.
//!
//! Fetches the newest article from the content API, enriches it with
//! excerpts from reference pages, and publishes the result as a new article.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;
use enhancer_shared::EnhancerError;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);

    if let Err(report) = commands::run(cli).await {
        let code = report
            .downcast_ref::<EnhancerError>()
            .map_or(1, EnhancerError::exit_code);
        eprintln!("Error: {report:?}");
        std::process::exit(code);
    }

    Ok(())
}

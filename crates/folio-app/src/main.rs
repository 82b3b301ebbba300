#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint for the Folio server and its maintenance commands.

use clap::Parser;
use folio_app::{AppResult, Cli, run_app};

/// Parse the command line and run the selected command to completion.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app(Cli::parse()).await
}

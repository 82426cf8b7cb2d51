//! crudgate server binary.

use clap::Parser;

use crudgate::cli::Cli;

#[tokio::main]
async fn main() {
    crudgate::logging::init();

    let cli = Cli::parse();
    if let Err(e) = crudgate::server::run(cli).await {
        tracing::error!(error = %e, "crudgate failed");
        std::process::exit(1);
    }
}

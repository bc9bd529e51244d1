use anyhow::Result;
use gitpulse::cli::Cli;
use gitpulse::logging::init_logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    cli.execute().await
}

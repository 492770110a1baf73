mod cmd;

use clap::Parser;
use cmd::config::{Effective, LoadArgs};

#[derive(Parser)]
#[command(
    name = "docload",
    about = "Bulk-load synthetic records into a document collection, then exercise delete/fetch/update/count"
)]
struct Cli {
    #[command(flatten)]
    args: LoadArgs,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let eff = match Effective::new(&cli.args) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cmd::run::run(&eff).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

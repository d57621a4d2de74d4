//! check-usage - Query the cluster accounting service for usage

use check_usage::{app, cli::Cli};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    // --verbose overrides RUST_LOG
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new(
            "check_usage=info,check_usage_client=info,check_usage_core=info",
        )
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    colored::control::set_override(cli.use_color());

    let site = cli.resolve_site();

    match app::run(&cli, site).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", app::error_report(&e, site));
            ExitCode::from(e.exit_code())
        }
    }
}

//! Playrec CLI entry point

use std::process::ExitCode;

use clap::Parser;

use playrec::cli::app::{load_merged_config, run, RunOptions};
use playrec::cli::args::Cli;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_merged_config(cli.into_config()).await;
    let options = RunOptions::from_config(&config);

    run(options).await
}

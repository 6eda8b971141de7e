//! cppenv CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cppenv_cli::cmd;
use cppenv_cli::ui::Output;
use cppenv_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(cli.quiet);

    match cli.command {
        Commands::Init { name, index_url } => {
            cmd::init::init(name.as_deref(), &index_url, &output).await
        }
        Commands::Install { mirror } => cmd::install::install(&mirror, &output).await,
        Commands::Run { command } => {
            let code = cmd::run::run(&command, &output).await?;
            std::process::exit(code)
        }
        Commands::Status => cmd::status::status().await,
        Commands::Toolchain { dir } => cmd::toolchain::toolchain(dir.as_deref(), &output),
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}

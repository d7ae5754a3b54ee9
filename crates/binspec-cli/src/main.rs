//! binspec CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use binspec_cli::cmd;
use binspec_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Embed {
            spec,
            version,
            mode,
            checksum_file,
            dry_run,
        } => cmd::embed::embed(&spec, version.as_deref(), mode, checksum_file, dry_run).await,
        Commands::Verify {
            spec,
            file,
            version,
            filename,
            skip_missing,
        } => {
            cmd::verify::verify(&spec, &file, version.as_deref(), filename.as_deref(), skip_missing)
                .await
        }
        Commands::Filenames {
            spec,
            version,
            current,
        } => cmd::filenames::filenames(&spec, version.as_deref(), current).await,
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}

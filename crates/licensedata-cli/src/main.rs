mod cli;
mod paths;

use anyhow::Context;
use clap::Parser;
use licensedata_sync::generate;

use crate::cli::Cli;
use crate::paths::resolve_output_paths;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();
    tracing::debug!("licensedata v{}", env!("CARGO_PKG_VERSION"));

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let (licenses, exceptions) =
        resolve_output_paths(cli.licenses.as_deref(), cli.exceptions.as_deref(), &cwd);
    println!("Writing licenses to:    {}", licenses.display());
    println!("Writing exceptions to:  {}", exceptions.display());

    let data = generate(&licenses, &exceptions, &cli.generate_options())
        .await
        .context("generating license data failed")?;

    println!("Updated data (version {})", data.licenses.version);
    println!(
        "Licenses:   {} entries in {}",
        data.licenses.licenses.len(),
        licenses.display()
    );
    println!(
        "Exceptions: {} entries in {}",
        data.exceptions.exceptions.len(),
        exceptions.display()
    );
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use inkpress::build::build_site;
use inkpress::config::{Config, Overrides};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Builds the static site.
#[derive(Parser)]
#[command(name = "inkpress", version, about)]
struct Cli {
    /// The project directory. `inkpress.yaml` is looked for here and in
    /// every parent directory.
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// The public URL of the site.
    #[arg(long, env = "SITE_URL")]
    site_url: Option<String>,

    /// Write the site here instead of the configured output directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log every step of the build.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        true => "inkpress=debug",
        false => "inkpress=info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_directory(
        &cli.project,
        Overrides {
            site_url: cli.site_url,
            output_directory: cli.output,
        },
    )?;

    if let Some(summary) = build_site(&config)? {
        println!("{}", summary);
    }
    Ok(())
}

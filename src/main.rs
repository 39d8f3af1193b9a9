use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use inradius::ReplayProvider;

/// Check whether a recorded track stays within a geofence
#[derive(Parser)]
struct Cli {
    /// Navigational URL holding the default zone and live coordinate
    url: String,
    /// JSON Lines file of fixes and errors to replay
    #[arg(short, long)]
    track: Option<PathBuf>,
    /// Behave as a host without geolocation support
    #[arg(long, action)]
    unavailable: bool,
    /// Print one JSON object per step
    #[arg(long, action)]
    json: bool,
    #[arg(short, long, action)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let provider = match (&args.track, args.unavailable) {
        (_, true) => ReplayProvider::unavailable(),
        (Some(path), false) => ReplayProvider::from_path(path)?,
        (None, false) => ReplayProvider::new(Vec::new()),
    };

    let mut stdout = std::io::stdout();
    let url = inradius::run(&args.url, provider, args.json, &mut stdout)?;
    println!("{}", url);
    Ok(())
}

//! Nostrframe terminal host.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a post from fixtures
//! nostrframe --element nostr-post --attr event-id=<hex> --fixtures fixtures.json
//!
//! # Machine-readable output
//! nostrframe --element nostr-profile --attr nip05=alice@example.com --fixtures fixtures.json --json
//! ```

use std::{io::Write, path::PathBuf, time::Duration};

use clap::Parser;
use nostrframe_cli::{CliError, Fixtures, MountOptions, mount, parse_attr};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Nostrframe terminal host
#[derive(Parser, Debug)]
#[command(name = "nostrframe")]
#[command(about = "Mount a Nostr element headlessly and report what it renders")]
#[command(version)]
struct Args {
    /// Element tag to mount
    #[arg(short, long, default_value = "nostr-post")]
    element: String,

    /// Attribute to set before attaching (key=value, repeatable)
    #[arg(short, long = "attr", value_parser = parse_attr)]
    attrs: Vec<(String, String)>,

    /// Fixture file answering relay requests (JSON)
    #[arg(short, long)]
    fixtures: Option<PathBuf>,

    /// Milliseconds to let the element settle after attaching
    #[arg(long, default_value = "50")]
    settle_ms: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let fixtures = match &args.fixtures {
        Some(path) => Fixtures::load(path)?,
        None => Fixtures::default(),
    };
    tracing::info!(element = %args.element, attributes = args.attrs.len(), "mounting");

    let options = MountOptions {
        element: args.element,
        attributes: args.attrs,
        settle: Duration::from_millis(args.settle_ms),
    };
    let report = mount(&options, fixtures).await?;

    let mut out = std::io::stdout().lock();
    if args.json {
        report.write_json(&mut out)?;
    } else {
        report.write_text(&mut out)?;
    }
    out.flush()?;

    Ok(())
}

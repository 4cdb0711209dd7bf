//! dr-pilot: a terminal console for Ramen disaster-recovery policies

use clap::Parser;
use color_eyre::Result;
use dr_pilot_tui::App;
use std::fs::File;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "dr-pilot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Kubeconfig context to use
    #[arg(short, long)]
    context: Option<String>,

    /// Namespace to scope placement controls to (default: all namespaces)
    #[arg(short, long)]
    namespace: Option<String>,

    /// Policy rows per page
    #[arg(long, default_value = "10")]
    page_size: usize,

    /// Policy list refresh interval in seconds
    #[arg(long, default_value = "10")]
    refresh: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/dr-pilot.log")]
    log_file: String,
}

/// Send tracing output to a file; stdout belongs to the TUI
fn init_tracing(debug: bool, path: &str) -> Result<()> {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let file = File::create(path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(true)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    color_eyre::install()?;
    init_tracing(cli.debug, &cli.log_file)?;

    tracing::info!(
        "dr-pilot starting (context: {})",
        cli.context.as_deref().unwrap_or("current")
    );

    let mut app = App::new(cli.context, cli.namespace, cli.page_size, cli.refresh);
    app.run().await?;

    tracing::info!("dr-pilot exiting");
    Ok(())
}

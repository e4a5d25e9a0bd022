//! `mifsmith` -- renders a simulation description into a MIF file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mifsmith_data::{DataLoadError, RenderOptions, render_file};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mifsmith", about = "Render a simulation description (RON, TOML or JSON) into a MIF file")]
struct Cli {
    /// Path to the description file
    description: PathBuf,
    /// Output path (defaults to the description's `target`)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Basename the simulator writes its results under
    #[arg(short, long)]
    basename: Option<String>,
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mifsmith=info,mifsmith_core=info,mifsmith_data=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let options = RenderOptions {
        output: cli.output,
        basename: cli.basename,
    };
    match render_file(&cli.description, &options) {
        Ok(report) => {
            info!(
                "{} -> {} ({} warning(s))",
                cli.description.display(),
                report.path.display(),
                report.warnings.len()
            );
            ExitCode::SUCCESS
        }
        // Block and session failures were already logged by the writer.
        Err(DataLoadError::Mif(_)) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

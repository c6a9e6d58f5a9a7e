use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use watrun::{run_wat_file, RunnerConfig, DEFAULT_ENTRY};

#[derive(Parser)]
#[command(name = "watrun")]
#[command(about = "Executes a WAT module and renders its debug captures.", long_about = None)]
struct Cli {
    /// Module to execute (.wat text or .wasm binary).
    wat_file: PathBuf,

    /// Exported entry function to invoke.
    #[arg(long, default_value = DEFAULT_ENTRY)]
    invoke: String,

    /// Write a JSON run report to this path after execution.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> std::process::ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    let config = RunnerConfig { entry: cli.invoke };
    let report = run_wat_file(&cli.wat_file, &config)?;

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("write report: {}", path.display()))?;
    }

    if let Some(trap) = &report.trap {
        eprintln!("error: {trap}");
    }

    Ok(std::process::ExitCode::from(report.exit_status as u8))
}

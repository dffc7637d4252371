// SPDX-License-Identifier: Apache-2.0

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use mssql_connector::observability::{init_tracing, LogFormat};
use mssql_connector::MssqlFunction;

/// Runs one MSSQL connector operation and prints the response envelope.
#[derive(Parser, Debug)]
#[command(name = "mssql-connector")]
#[command(version)]
#[command(about = "Run a data operation against Microsoft SQL Server", long_about = None)]
struct Args {
    /// JSON input file (`databaseConnection`, `operation`, `data`); stdin when omitted
    input: Option<PathBuf>,

    /// Log output format written to stderr (text or json)
    #[arg(long = "log-format", env = "MSSQL_CONNECTOR_LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let input = read_input(args.input.as_ref())?;
    let function = MssqlFunction::new();

    match function.execute_json(&input).await {
        Ok(response) => {
            let json = serde_json::to_string(&response).context("Failed to encode response")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let json = serde_json::to_string(&serde_json::json!({
                "error": err,
                "message": err.to_string(),
            }))
            .context("Failed to encode error")?;
            println!("{json}");
            Ok(ExitCode::FAILURE)
        }
    }
}

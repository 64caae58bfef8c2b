//! Line-delimited JSON worker.
//!
//! Reads one request per line from stdin, dispatches it to
//! `winpilot_core::tools::Desktop`, writes one response per line to stdout.
//! Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "winpilot-worker", about = "winpilot JSON IPC worker process")]
struct Args {
    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Deserialize)]
struct Request {
    id: u64,
    method: String,
    #[serde(default)]
    params: serde_json::Value,
}

#[derive(Serialize)]
struct Response {
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn write_response(stdout: &mut io::Stdout, resp: &Response) {
    match serde_json::to_string(resp) {
        Ok(json) => {
            let _ = writeln!(stdout, "{json}");
        }
        Err(e) => {
            log::error!("response serialization failed: {e}");
            // Serialization failed -- send minimal error response.
            let _ = writeln!(
                stdout,
                r#"{{"id":{},"error":"response serialization failed"}}"#,
                resp.id
            );
        }
    }
    let _ = stdout.flush();
}

fn main() {
    let args = Args::parse();
    winpilot_cli::init_logging(args.verbose);

    let desktop = winpilot_cli::desktop_or_exit(args.config.as_deref());
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    log::info!("winpilot-worker: ready");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let req: Request = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("rejecting malformed request: {e}");
                // Parse error -- use id=0 since we can't extract it.
                let resp = Response {
                    id: 0,
                    result: None,
                    error: Some(format!("invalid JSON: {e}")),
                };
                write_response(&mut stdout, &resp);
                continue;
            }
        };

        log::debug!("request {}: {}", req.id, req.method);
        let tool = desktop.dispatch_json(&req.method, req.params);
        let resp = match serde_json::to_value(&tool) {
            Ok(result) => Response {
                id: req.id,
                result: Some(result),
                error: None,
            },
            Err(e) => Response {
                id: req.id,
                result: None,
                error: Some(format!("response serialization failed: {e}")),
            },
        };
        write_response(&mut stdout, &resp);
    }

    log::info!("winpilot-worker: stdin closed, exiting");
}

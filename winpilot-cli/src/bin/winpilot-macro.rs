//! Run a macro from a JSON file (or stdin with `-`).

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "winpilot-macro", about = "Execute a JSON macro against the desktop")]
struct Args {
    /// JSON array of commands; `-` reads stdin
    file: PathBuf,

    /// Macro name for logs and the result
    #[arg(short, long)]
    name: Option<String>,

    /// Enable debug logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn read_commands(file: &PathBuf) -> std::io::Result<String> {
    if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}

fn main() {
    let args = Args::parse();
    winpilot_cli::init_logging(args.verbose);

    let commands = match read_commands(&args.file) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", args.file.display());
            std::process::exit(2);
        }
    };

    let desktop = winpilot_cli::desktop_or_exit(args.config.as_deref());
    let response = desktop.run_macro(&commands, args.name.as_deref());
    std::process::exit(winpilot_cli::emit(&response));
}
